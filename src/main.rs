use std::path::PathBuf;
use std::sync::Arc;

use persona_chat::chat::ChatService;
use persona_chat::completion::XaiBackend;
use persona_chat::config::{CompletionConfig, ServerConfig};
use persona_chat::http::{AppState, chat_routes};
use persona_chat::import;
use persona_chat::personas::PersonaRegistry;
use persona_chat::store::{LibSqlStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server_config = ServerConfig::from_env()?;
    let registry = PersonaRegistry::from_env()?;

    let store: Arc<dyn Store> = Arc::new(LibSqlStore::open(&server_config.db_path).await?);

    // Offline import mode: migrate legacy JSON history files and exit.
    if let Some(dir) = import_dir_arg() {
        let summary = import::import_dir(store.as_ref(), &dir).await?;
        eprintln!(
            "Imported {} message(s) from {} file(s) in {}",
            summary.messages,
            summary.files,
            dir.display()
        );
        return Ok(());
    }

    let completion_config = CompletionConfig::from_env()?;
    let backend = Arc::new(XaiBackend::new(&completion_config)?);
    let chat = Arc::new(ChatService::new(registry, Arc::clone(&store), backend));

    eprintln!("💬 Persona Chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", completion_config.model);
    eprintln!("   Database: {}", server_config.db_path.display());
    eprintln!("   Personas: {}", chat.registry().names().collect::<Vec<_>>().join(", "));
    eprintln!("   Listening: http://0.0.0.0:{}\n", server_config.port);

    let state = AppState { store, chat };
    let app = chat_routes(state, &server_config.asset_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_config.port)).await?;
    tracing::info!(port = server_config.port, "Persona chat server started");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse `--import-dir <path>` from the command line.
fn import_dir_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--import-dir" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
