//! Completion client — drives one external chat-completion session per
//! orchestrated exchange.
//!
//! The transport lives behind the `CompletionBackend` trait so tests can
//! substitute a deterministic fake that records the turns it receives and
//! returns canned text.

mod xai;

pub use xai::XaiBackend;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CompletionError;

/// Role of a single turn in a completion conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Transport for chat completions.
///
/// `complete` receives the full turn list for the session and returns the
/// assistant's reply text. Implementations never retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Model identifier the backend is bound to.
    fn model(&self) -> &str;

    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError>;
}

/// A single-use conversation session bound to one backend.
///
/// Stateful only for the duration of one orchestrated exchange; never
/// persisted or reused across requests.
pub struct ChatSession {
    backend: Arc<dyn CompletionBackend>,
    turns: Vec<Turn>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            turns: Vec::new(),
        }
    }

    /// Seed the session with a system instruction.
    ///
    /// Must be called before any user turn, at most once per session.
    pub fn instruct(&mut self, text: impl Into<String>) {
        debug_assert!(
            self.turns.is_empty(),
            "system instruction must precede all other turns"
        );
        self.turns.push(Turn::system(text));
    }

    /// Append a historical user/assistant pair without invoking the model.
    pub fn replay(&mut self, input: impl Into<String>, response: impl Into<String>) {
        self.turns.push(Turn::user(input));
        self.turns.push(Turn::assistant(response));
    }

    /// Append a new user turn and invoke the model, returning its reply.
    pub async fn ask(&mut self, input: impl Into<String>) -> Result<String, CompletionError> {
        self.turns.push(Turn::user(input));
        let reply = self.backend.complete(&self.turns).await?;
        self.turns.push(Turn::assistant(reply.clone()));
        Ok(reply)
    }

    /// The turns accumulated so far.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
