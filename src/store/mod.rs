//! Persistence layer — SQLite-backed storage for personalities and messages.

mod libsql_store;

pub use libsql_store::LibSqlStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;

/// A known personality row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalityRow {
    pub name: String,
}

/// One persisted exchange: a user input paired with the assistant response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredExchange {
    pub id: i64,
    pub input: String,
    pub response: String,
    pub liked: bool,
}

/// Backend-agnostic storage for conversation state.
///
/// Every operation commits immediately; there are no transactions spanning
/// calls, so concurrent callers interleave at single-statement granularity.
#[async_trait]
pub trait Store: Send + Sync {
    /// Every known personality, in no guaranteed order.
    async fn list_personalities(&self) -> Result<Vec<PersonalityRow>, StoreError>;

    /// All exchanges for a personality in creation order — the conversation
    /// timeline. Unknown or empty personalities yield an empty list, not an
    /// error.
    async fn history(&self, personality: &str) -> Result<Vec<StoredExchange>, StoreError>;

    /// Insert a new exchange with `liked = false`, creating the personality
    /// row first if it does not exist. Returns the newly assigned id.
    async fn save_message(
        &self,
        personality: &str,
        input: &str,
        response: &str,
    ) -> Result<i64, StoreError>;

    /// Flip the liked flag and return the new value. A missing id returns
    /// `false` without error.
    async fn toggle_like(&self, id: i64) -> Result<bool, StoreError>;

    /// Replace the response text of a message. Returns whether a row was
    /// affected.
    async fn update_content(&self, id: i64, response: &str) -> Result<bool, StoreError>;
}
