//! `UserHistoryStore` trait — async interface for per-user memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Per-user history-taking memory.
///
/// One record per conversation participant, keyed by user identity.
/// Created lazily on first access; never explicitly destroyed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistory {
    /// Address the patient was asked to remember, for later recall.
    pub amts_address: Option<String>,
}

/// Backend-agnostic store for user history records.
#[async_trait]
pub trait UserHistoryStore: Send + Sync {
    /// Load the record for a user. An absent record is the empty default.
    async fn get(&self, user_id: &str) -> Result<UserHistory, StoreError>;

    /// Persist the record for a user, overwriting any previous value.
    async fn set(&self, user_id: &str, record: &UserHistory) -> Result<(), StoreError>;
}
