//! Runtime configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default chat-completion endpoint (xAI, OpenAI-compatible wire shape).
pub const DEFAULT_API_HOST: &str = "https://api.x.ai";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "grok-4";

/// Default upper bound on a single completion round trip.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Connection settings for the external chat-completion service.
#[derive(Clone)]
pub struct CompletionConfig {
    /// API credential. Required.
    pub api_key: SecretString,
    /// Base URL of the completion endpoint.
    pub api_host: String,
    /// Model identifier every session is bound to.
    pub model: String,
    /// Per-request timeout. Completions can legitimately run very long.
    pub timeout: Duration,
}

impl CompletionConfig {
    /// Read completion settings from the environment.
    ///
    /// `XAI_API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("XAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("XAI_API_KEY".to_string()))?;

        let api_host =
            std::env::var("XAI_API_HOST").unwrap_or_else(|_| DEFAULT_API_HOST.to_string());

        let model =
            std::env::var("PERSONA_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = match std::env::var("PERSONA_CHAT_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "PERSONA_CHAT_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_host,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// Directory holding the static browser client.
    pub asset_dir: PathBuf,
}

impl ServerConfig {
    /// Read server settings from the environment, with defaults for all.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PERSONA_CHAT_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PERSONA_CHAT_PORT".to_string(),
                message: format!("expected a port number, got {raw:?}"),
            })?,
            Err(_) => 8080,
        };

        let db_path = std::env::var("PERSONA_CHAT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/persona-chat.db"));

        let asset_dir = std::env::var("PERSONA_CHAT_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./static"));

        Ok(Self {
            port,
            db_path,
            asset_dir,
        })
    }
}
