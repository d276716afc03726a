// In-memory implementation of UserStore for tests.

use crate::core::users::{RecordUpdate, UserError, UserRecord, UserStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// **DashMap:** `entry()` holds the shard lock for the key while the update
/// closure runs, so updates to one user are serialized without a global lock.
pub struct InMemoryUserStore {
    data: DashMap<u64, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, user_id: u64) -> Result<UserRecord, UserError> {
        Ok(self
            .data
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id))
            .clone())
    }

    async fn put(&self, user_id: u64, record: UserRecord) -> Result<(), UserError> {
        self.data.insert(user_id, record);
        Ok(())
    }

    async fn update(&self, user_id: u64, apply: RecordUpdate<'_>) -> Result<UserRecord, UserError> {
        let mut entry = self
            .data
            .entry(user_id)
            .or_insert_with(|| UserRecord::new(user_id));

        // Work on a copy so a failed update leaves the stored record untouched.
        let mut record = entry.clone();
        apply(&mut record)?;
        *entry = record.clone();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_initializes_once() {
        let store = InMemoryUserStore::new();
        let mut record = store.get(1).await.unwrap();
        assert_eq!(record.level, 1);

        record.tokens = 4;
        store.put(1, record.clone()).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), record);
    }

    #[tokio::test]
    async fn failed_update_is_discarded() {
        let store = InMemoryUserStore::new();
        let result = store
            .update(
                2,
                Box::new(|record| {
                    record.tokens = 50;
                    Err(UserError::AlreadyClaimed)
                }),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(2).await.unwrap().tokens, 0);
    }
}
