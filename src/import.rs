//! One-shot import of legacy JSON history files into the store.
//!
//! Earlier deployments kept each personality's history in a
//! `<name>_chat.json` file: a JSON array of `{input, response}` objects in
//! conversation order. This utility walks a directory, finds those files,
//! and appends their exchanges to the database. It runs offline via
//! `--import-dir`, never as part of the live service.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::store::Store;

const LEGACY_SUFFIX: &str = "_chat.json";

#[derive(Debug, Deserialize)]
struct LegacyExchange {
    input: String,
    response: String,
}

/// Counts of what an import run touched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub files: usize,
    pub messages: usize,
}

/// Import every `<name>_chat.json` file in `dir`.
///
/// Files are processed in name order so reruns are deterministic; messages
/// within a file keep their array order, which becomes insertion order in
/// the store.
pub async fn import_dir(store: &dyn Store, dir: &Path) -> anyhow::Result<ImportSummary> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| legacy_persona_name(&path).map(|name| (path, name)))
        .collect();
    entries.sort();

    let mut summary = ImportSummary::default();
    for (path, name) in entries {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let history: Vec<LegacyExchange> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;

        for exchange in &history {
            store
                .save_message(&name, &exchange.input, &exchange.response)
                .await?;
        }

        info!(
            file = %path.display(),
            personality = %name,
            messages = history.len(),
            "Imported legacy history"
        );
        summary.files += 1;
        summary.messages += history.len();
    }

    Ok(summary)
}

fn legacy_persona_name(path: &Path) -> Option<String> {
    path.file_name()?
        .to_str()?
        .strip_suffix(LEGACY_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.to_ascii_lowercase())
}
