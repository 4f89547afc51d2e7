//! libSQL store — async `Store` implementation over a local SQLite file.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::{debug, info};

use super::{PersonalityRow, Store, StoredExchange};
use crate::error::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS personalities (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        personality TEXT NOT NULL REFERENCES personalities(name),
        input TEXT NOT NULL,
        response TEXT NOT NULL,
        liked INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_personality ON messages(personality);
";

/// libSQL database backend.
///
/// Holds a single connection reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use;
/// writes serialize at statement granularity inside SQLite.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self { db, conn };
        store.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self { db, conn };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(SCHEMA)
            .await
            .map_err(|e| StoreError::Migration(format!("Failed to create schema: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Store for LibSqlStore {
    async fn list_personalities(&self) -> Result<Vec<PersonalityRow>, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT name FROM personalities", ())
            .await
            .map_err(|e| StoreError::Query(format!("list_personalities: {e}")))?;

        let mut personalities = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let name: String = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("list_personalities row: {e}")))?;
            personalities.push(PersonalityRow { name });
        }
        Ok(personalities)
    }

    async fn history(&self, personality: &str) -> Result<Vec<StoredExchange>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, input, response, liked FROM messages
                 WHERE personality = ?1 ORDER BY id ASC",
                params![personality],
            )
            .await
            .map_err(|e| StoreError::Query(format!("history: {e}")))?;

        let mut history = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            history.push(
                row_to_exchange(&row)
                    .map_err(|e| StoreError::Query(format!("history row: {e}")))?,
            );
        }
        Ok(history)
    }

    async fn save_message(
        &self,
        personality: &str,
        input: &str,
        response: &str,
    ) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO personalities (name) VALUES (?1)",
                params![personality],
            )
            .await
            .map_err(|e| StoreError::Query(format!("save_message personality upsert: {e}")))?;

        // RETURNING reads the id from the insert statement itself;
        // last_insert_rowid() is connection-wide and races under
        // concurrent saves on the shared connection.
        let mut rows = self
            .conn
            .query(
                "INSERT INTO messages (personality, input, response, liked, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4) RETURNING id",
                params![personality, input, response, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("save_message insert: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("save_message id readback: {e}")))?
            .ok_or_else(|| StoreError::Query("save_message insert returned no id".to_string()))?;
        let id: i64 = row
            .get(0)
            .map_err(|e| StoreError::Query(format!("save_message id row: {e}")))?;

        debug!(personality = personality, id = id, "Message saved");
        Ok(id)
    }

    async fn toggle_like(&self, id: i64) -> Result<bool, StoreError> {
        let affected = self
            .conn
            .execute(
                "UPDATE messages SET liked = 1 - liked WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("toggle_like: {e}")))?;

        // Missing ids behave like an un-liked message rather than an error.
        if affected == 0 {
            return Ok(false);
        }

        let mut rows = self
            .conn
            .query("SELECT liked FROM messages WHERE id = ?1", params![id])
            .await
            .map_err(|e| StoreError::Query(format!("toggle_like readback: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let liked: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("toggle_like row: {e}")))?;
                debug!(id = id, liked = liked != 0, "Like toggled");
                Ok(liked != 0)
            }
            Ok(None) => Ok(false),
            Err(e) => Err(StoreError::Query(format!("toggle_like readback: {e}"))),
        }
    }

    async fn update_content(&self, id: i64, response: &str) -> Result<bool, StoreError> {
        let affected = self
            .conn
            .execute(
                "UPDATE messages SET response = ?1 WHERE id = ?2",
                params![response, id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("update_content: {e}")))?;
        Ok(affected > 0)
    }
}

fn row_to_exchange(row: &libsql::Row) -> Result<StoredExchange, libsql::Error> {
    let liked: i64 = row.get(3)?;
    Ok(StoredExchange {
        id: row.get(0)?,
        input: row.get(1)?,
        response: row.get(2)?,
        liked: liked != 0,
    })
}
