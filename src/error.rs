//! Error types for the persona chat service.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to load persona file {path}: {message}")]
    PersonaFile { path: String, message: String },
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Completion client errors.
///
/// No variant is retried anywhere; every failure surfaces synchronously to
/// the caller of the request that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Completion credential rejected or missing: {0}")]
    Auth(String),

    #[error("Could not reach completion endpoint: {0}")]
    Connection(String),

    #[error("Upstream completion failure: {0}")]
    Upstream(String),

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),
}

/// Orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
