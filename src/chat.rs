//! Chat orchestration — replays stored history into a fresh completion
//! session and returns the new exchange.

use std::sync::Arc;

use tracing::debug;

use crate::completion::{ChatSession, CompletionBackend};
use crate::error::ChatError;
use crate::personas::PersonaRegistry;
use crate::store::Store;

/// One generated exchange, not yet persisted.
///
/// `personality` is the canonical registry name, so callers persist under a
/// single casing no matter how the request spelled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub personality: String,
    pub input: String,
    pub response: String,
}

/// Generates replies for a personality.
///
/// Persisting the result is deliberately the caller's concern: a
/// display-only preview path can reuse this service without writing to the
/// store.
pub struct ChatService {
    registry: PersonaRegistry,
    store: Arc<dyn Store>,
    backend: Arc<dyn CompletionBackend>,
}

impl ChatService {
    pub fn new(
        registry: PersonaRegistry,
        store: Arc<dyn Store>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            registry,
            store,
            backend,
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Produce the assistant's reply to `input` for the named personality.
    ///
    /// Builds a fresh single-use session: one composed system instruction,
    /// every stored exchange replayed in creation order, then the new user
    /// turn. Completion failures propagate unchanged.
    pub async fn respond(&self, personality: &str, input: &str) -> Result<Exchange, ChatError> {
        let persona = self
            .registry
            .find(personality)
            .ok_or_else(|| ChatError::UnknownPersonality(personality.to_string()))?;

        let history = self.store.history(&persona.name).await?;

        let mut session = ChatSession::new(Arc::clone(&self.backend));
        session.instruct(self.registry.system_instruction(persona));
        for exchange in &history {
            session.replay(&exchange.input, &exchange.response);
        }

        debug!(
            personality = %persona.name,
            replayed = history.len(),
            model = self.backend.model(),
            "Asking model"
        );
        let response = session.ask(input).await?;

        Ok(Exchange {
            personality: persona.name.clone(),
            input: input.to_string(),
            response,
        })
    }
}
