//! libSQL backend — async `UserHistoryStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::StoreError;
use crate::store::traits::{UserHistory, UserHistoryStore};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS user_history (
    user_id      TEXT PRIMARY KEY,
    amts_address TEXT,
    updated_at   TEXT NOT NULL
)";

/// libSQL user history store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "User history database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(SCHEMA, ())
            .await
            .map_err(|e| StoreError::Query(format!("Failed to create schema: {e}")))?;
        Ok(())
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

#[async_trait]
impl UserHistoryStore for LibSqlStore {
    async fn get(&self, user_id: &str) -> Result<UserHistory, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT amts_address FROM user_history WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to load user history: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to read user history row: {e}")))?;

        match row {
            Some(row) => {
                let amts_address: Option<String> = row.get(0).ok();
                Ok(UserHistory { amts_address })
            }
            // Absent record: lazily created as the empty default.
            None => Ok(UserHistory::default()),
        }
    }

    async fn set(&self, user_id: &str, record: &UserHistory) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO user_history (user_id, amts_address, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                     amts_address = excluded.amts_address,
                     updated_at = excluded.updated_at",
                params![
                    user_id,
                    opt_text(record.amts_address.as_deref()),
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to save user history: {e}")))?;
        Ok(())
    }
}
