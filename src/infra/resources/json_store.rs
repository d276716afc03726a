use crate::core::resources::{NewResource, Resource, ResourceError, ResourceStore};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// JSON-file resource catalog: one array of resources in submission order.
///
/// The list is loaded once and kept in memory; every change rewrites the
/// file while holding the lock.
pub struct JsonResourceStore {
    path: PathBuf,
    resources: Mutex<Vec<Resource>>,
}

impl JsonResourceStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ResourceError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage)?;
        }

        let resources = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ResourceError::StorageError(format!("{} is not valid JSON: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(storage(e)),
        };
        tracing::info!(path = %path.display(), count = resources.len(), "Loaded resource catalog");

        Ok(Self {
            path,
            resources: Mutex::new(resources),
        })
    }

    async fn persist(&self, resources: &[Resource]) -> Result<(), ResourceError> {
        let json = serde_json::to_vec_pretty(resources).map_err(storage)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(storage)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(storage)
    }
}

fn storage(e: impl std::fmt::Display) -> ResourceError {
    ResourceError::StorageError(e.to_string())
}

#[async_trait]
impl ResourceStore for JsonResourceStore {
    async fn add(&self, resource: NewResource) -> Result<Resource, ResourceError> {
        let mut resources = self.resources.lock().await;
        let id = resources.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let stored = resource.into_resource(id);
        resources.push(stored.clone());
        if let Err(e) = self.persist(&resources).await {
            resources.pop();
            return Err(e);
        }
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Resource>, ResourceError> {
        let resources = self.resources.lock().await;
        Ok(resources.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Resource>, ResourceError> {
        Ok(self.resources.lock().await.clone())
    }

    async fn approve(&self, id: i64, approver: u64) -> Result<Resource, ResourceError> {
        let mut resources = self.resources.lock().await;
        let position = resources
            .iter()
            .position(|r| r.id == id)
            .ok_or(ResourceError::NotFound(id))?;
        if resources[position].approved {
            return Err(ResourceError::AlreadyApproved(id));
        }

        resources[position].approved = true;
        resources[position].approver = Some(approver.to_string());
        if let Err(e) = self.persist(&resources).await {
            resources[position].approved = false;
            resources[position].approver = None;
            return Err(e);
        }
        Ok(resources[position].clone())
    }
}
