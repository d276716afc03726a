// Community resource catalog: members submit links, moderators approve them,
// and `/resources` serves the approved ones next to a few built-in links.

use super::resource_models::{NewResource, Resource, ResourceSearch};
use crate::core::commands::CommandError;
use crate::core::helpers::{format_date, is_valid_description, MAX_DESCRIPTION_LEN};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

pub const MAX_LABEL_LEN: usize = 50;

/// Links that are always offered, keyed by lowercase topic.
const BUILTIN_LINKS: &[(&str, &[&str])] = &[
    (
        "javascript",
        &["https://developer.mozilla.org/en-US/docs/Web/JavaScript"],
    ),
    ("typescript", &["https://www.typescriptlang.org/docs/"]),
];

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Resource #{0} not found")]
    NotFound(i64),

    #[error("Resource #{0} is already approved")]
    AlreadyApproved(i64),
}

impl From<ResourceError> for CommandError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::StorageError(detail) => CommandError::Io(detail),
            other => CommandError::Validation(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Append a submission and return it with its assigned id.
    async fn add(&self, resource: NewResource) -> Result<Resource, ResourceError>;

    async fn get(&self, id: i64) -> Result<Option<Resource>, ResourceError>;

    /// All resources in insertion order.
    async fn list(&self) -> Result<Vec<Resource>, ResourceError>;

    /// Mark `id` approved by `approver`.
    async fn approve(&self, id: i64, approver: u64) -> Result<Resource, ResourceError>;
}

pub struct ResourceService {
    store: Arc<dyn ResourceStore>,
}

impl ResourceService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    pub fn builtin_links(topic: &str) -> Vec<&'static str> {
        let topic = topic.trim().to_lowercase();
        BUILTIN_LINKS
            .iter()
            .find(|(key, _)| *key == topic)
            .map(|(_, links)| links.to_vec())
            .unwrap_or_default()
    }

    /// Check a submission and build the record to store.
    pub fn validate(
        user_id: u64,
        subject: &str,
        topic: &str,
        description: &str,
        link: &str,
        now: DateTime<Utc>,
    ) -> Result<NewResource, ResourceError> {
        let subject = validate_label("Subject", subject)?;
        let topic = validate_label("Topic", topic)?;

        let description = description.trim();
        if !is_valid_description(description) {
            return Err(ResourceError::Invalid(format!(
                "Description must be at most {} characters of letters, digits, spaces and ! # ? + - _ : \" ' {{ }} [ ] %.",
                MAX_DESCRIPTION_LEN
            )));
        }

        let link = link.trim();
        let parsed = Url::parse(link)
            .map_err(|_| ResourceError::Invalid("Link must be a valid http(s) URL.".to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ResourceError::Invalid(
                "Link must be a valid http(s) URL.".to_string(),
            ));
        }

        Ok(NewResource {
            subject,
            topic,
            description: description.to_string(),
            link: link.to_string(),
            added_by: user_id,
            created_at: format_date(now),
        })
    }

    pub async fn submit(
        &self,
        user_id: u64,
        subject: &str,
        topic: &str,
        description: &str,
        link: &str,
        now: DateTime<Utc>,
    ) -> Result<Resource, ResourceError> {
        let new = Self::validate(user_id, subject, topic, description, link, now)?;
        let stored = self.store.add(new).await?;
        tracing::info!(id = stored.id, user_id, subject = %stored.subject, "Resource submitted");
        Ok(stored)
    }

    /// Built-in links plus approved catalog entries for `query`.
    pub async fn search(&self, query: &str) -> Result<ResourceSearch, ResourceError> {
        let catalog = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| r.approved && r.matches(query))
            .collect();

        Ok(ResourceSearch {
            builtin: Self::builtin_links(query),
            catalog,
        })
    }

    pub async fn pending(&self) -> Result<Vec<Resource>, ResourceError> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| !r.approved)
            .collect())
    }

    pub async fn approve(&self, id: i64, approver: u64) -> Result<Resource, ResourceError> {
        let resource = self.store.approve(id, approver).await?;
        tracing::info!(id, approver, "Resource approved");
        Ok(resource)
    }
}

fn validate_label(what: &str, value: &str) -> Result<String, ResourceError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > MAX_LABEL_LEN {
        return Err(ResourceError::Invalid(format!(
            "{} must be between 1 and {} characters.",
            what, MAX_LABEL_LEN
        )));
    }
    Ok(value.to_string())
}
