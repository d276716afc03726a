use crate::core::users::{RecordUpdate, UserError, UserRecord, UserStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type UserFile = BTreeMap<String, UserRecord>;

/// JSON-file user store. The whole file is a single object mapping user id
/// to record:
/// { "1234": { "userId": "1234", "level": 1, ... } }
///
/// Every call reads the file from disk, so hand edits are picked up without
/// a restart. All calls go through `lock`, making each read-modify-write
/// cycle exclusive within the process.
pub struct JsonUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonUserStore {
    /// Open the store at `path`, creating an empty file (and its directory)
    /// if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, UserError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage)?;
        }
        if tokio::fs::metadata(&path).await.is_err() {
            tokio::fs::write(&path, b"{}").await.map_err(storage)?;
            tracing::info!(path = %path.display(), "Created users file");
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<UserFile, UserError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(UserFile::new()),
            Err(e) => return Err(storage(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(UserFile::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            UserError::StorageError(format!("{} is not valid JSON: {}", self.path.display(), e))
        })
    }

    /// Write to a sibling temp file and rename it over the original so a
    /// crash mid-write never leaves a truncated file behind.
    async fn write_all(&self, users: &UserFile) -> Result<(), UserError> {
        let json = serde_json::to_vec_pretty(users).map_err(storage)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(storage)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(storage)
    }
}

fn storage(e: impl std::fmt::Display) -> UserError {
    UserError::StorageError(e.to_string())
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn get(&self, user_id: u64) -> Result<UserRecord, UserError> {
        let _guard = self.lock.lock().await;
        let mut users = self.read_all().await?;
        let key = user_id.to_string();
        if let Some(record) = users.get(&key) {
            return Ok(record.clone());
        }

        let record = UserRecord::new(user_id);
        users.insert(key, record.clone());
        self.write_all(&users).await?;
        tracing::debug!(user_id, "Initialized user record");
        Ok(record)
    }

    async fn put(&self, user_id: u64, record: UserRecord) -> Result<(), UserError> {
        let _guard = self.lock.lock().await;
        let mut users = self.read_all().await?;
        users.insert(user_id.to_string(), record);
        self.write_all(&users).await
    }

    async fn update(&self, user_id: u64, apply: RecordUpdate<'_>) -> Result<UserRecord, UserError> {
        let _guard = self.lock.lock().await;
        let mut users = self.read_all().await?;
        let record = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord::new(user_id));
        apply(record)?;
        let updated = record.clone();
        self.write_all(&users).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn first_load_persists_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("users.json");
        let store = JsonUserStore::open(&path).await.unwrap();

        let first = store.get(42).await.unwrap();
        assert_eq!(first.level, 1);
        assert_eq!(first.tokens, 0);

        // A fresh store over the same file sees the persisted record.
        let reopened = JsonUserStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(42).await.unwrap(), first);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["42"]["userId"], "42");
    }

    #[tokio::test]
    async fn put_overwrites_only_that_user() {
        let dir = tempdir().unwrap();
        let store = JsonUserStore::open(dir.path().join("users.json")).await.unwrap();
        store.get(1).await.unwrap();

        let mut record = UserRecord::new(2);
        record.tokens = 30;
        store.put(2, record).await.unwrap();

        assert_eq!(store.get(2).await.unwrap().tokens, 30);
        assert_eq!(store.get(1).await.unwrap().tokens, 0);
    }

    #[tokio::test]
    async fn reads_legacy_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"7": {"userId": "7", "level": 4, "tokens": 12, "dailyRewardClaimed": "", "lastClaimed": false}}"#,
        )
        .unwrap();

        let store = JsonUserStore::open(&path).await.unwrap();
        let record = store.get(7).await.unwrap();
        assert_eq!(record.level, 4);
        assert_eq!(record.tokens, 12);
        assert!(record.last_claimed.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonUserStore::open(&path).await.unwrap();
        assert!(matches!(store.get(1).await, Err(UserError::StorageError(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = JsonUserStore::open(dir.path().join("users.json")).await.unwrap();
        store.get(5).await.unwrap();

        let result = store
            .update(
                5,
                Box::new(|record| {
                    record.tokens = 999;
                    Err(UserError::AlreadyClaimed)
                }),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(5).await.unwrap().tokens, 0);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let dir = tempdir().unwrap();
        let store = Arc::new(JsonUserStore::open(dir.path().join("users.json")).await.unwrap());

        let mut tasks = Vec::new();
        for i in 0..20u64 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .update(
                        i % 4,
                        Box::new(|record| {
                            record.tokens += 1;
                            Ok(())
                        }),
                    )
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut total = 0;
        for id in 0..4 {
            total += store.get(id).await.unwrap().tokens;
        }
        assert_eq!(total, 20);
    }
}
