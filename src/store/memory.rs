//! In-memory store — for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::traits::{UserHistory, UserHistoryStore};

/// `UserHistoryStore` backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, UserHistory>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserHistoryStore for InMemoryStore {
    async fn get(&self, user_id: &str) -> Result<UserHistory, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn set(&self, user_id: &str, record: &UserHistory) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(user_id.to_string(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_unknown_user_returns_default() {
        let store = InMemoryStore::new();
        let record = store.get("dr-watson").await.unwrap();
        assert_eq!(record, UserHistory::default());
        assert!(record.amts_address.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryStore::new();
        let record = UserHistory {
            amts_address: Some("221B Baker St".into()),
        };
        store.set("dr-watson", &record).await.unwrap();
        assert_eq!(store.get("dr-watson").await.unwrap(), record);
    }

    #[tokio::test]
    async fn set_overwrites_previous_record() {
        let store = InMemoryStore::new();
        store
            .set(
                "dr-watson",
                &UserHistory {
                    amts_address: Some("221B Baker St".into()),
                },
            )
            .await
            .unwrap();
        store
            .set(
                "dr-watson",
                &UserHistory {
                    amts_address: Some("10 Downing St".into()),
                },
            )
            .await
            .unwrap();

        let record = store.get("dr-watson").await.unwrap();
        assert_eq!(record.amts_address.as_deref(), Some("10 Downing St"));
    }

    #[tokio::test]
    async fn records_are_isolated_per_user() {
        let store = InMemoryStore::new();
        store
            .set(
                "dr-watson",
                &UserHistory {
                    amts_address: Some("221B Baker St".into()),
                },
            )
            .await
            .unwrap();

        let other = store.get("dr-bell").await.unwrap();
        assert!(other.amts_address.is_none());
    }
}
