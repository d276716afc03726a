// User progression business logic: lazy record creation, daily token
// rewards, and submission-driven levels.
//
// Like the rest of core/, this works with primitive ids only. Persistence is
// behind the `UserStore` port; the JSON file implementation lives in infra/.

use super::user_models::{DailyClaim, LevelChange, UserRecord};
use crate::core::commands::CommandError;
use crate::core::helpers::{format_date, is_same_day};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Daily reward already claimed today")]
    AlreadyClaimed,
}

impl From<UserError> for CommandError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::StorageError(detail) => CommandError::Io(detail),
            UserError::AlreadyClaimed => CommandError::Validation(
                "You have already claimed your daily reward today. Come back tomorrow!".to_string(),
            ),
        }
    }
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// A mutation applied to one record inside the store's critical section.
/// Returning an error aborts the update and nothing is written.
pub type RecordUpdate<'a> =
    Box<dyn FnOnce(&mut UserRecord) -> Result<(), UserError> + Send + 'a>;

/// Trait for persisting user records.
///
/// Implementations must serialize `update` calls so that two concurrent
/// read-modify-write cycles can never lose each other's changes. Callers
/// should prefer `update` over a `get` followed by `put`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Return the record for `user_id`, creating and persisting the default
    /// record on first access.
    async fn get(&self, user_id: u64) -> Result<UserRecord, UserError>;

    /// Overwrite the record for `user_id`.
    async fn put(&self, user_id: u64, record: UserRecord) -> Result<(), UserError>;

    /// Atomically load-or-create, mutate, and persist one record. Returns the
    /// record as written.
    async fn update(&self, user_id: u64, apply: RecordUpdate<'_>) -> Result<UserRecord, UserError>;
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct RewardConfig {
    /// Tokens granted by `/daily`, once per UTC day.
    pub daily_reward: i64,
    /// Tokens granted when a moderator approves a submitted resource.
    pub submission_reward: i64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            daily_reward: 10,
            submission_reward: 5,
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct UserService {
    store: Arc<dyn UserStore>,
    config: RewardConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self::new_with_config(store, RewardConfig::default())
    }

    pub fn new_with_config(store: Arc<dyn UserStore>, config: RewardConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Level reached after `approved` accepted submissions.
    pub fn level_for_submissions(approved: i64) -> i64 {
        1 + approved.max(0)
    }

    pub async fn profile(&self, user_id: u64) -> Result<UserRecord, UserError> {
        self.store.get(user_id).await
    }

    pub fn claimed_on(record: &UserRecord, now: DateTime<Utc>) -> bool {
        record.daily_reward_claimed
            && record
                .last_claimed
                .as_deref()
                .is_some_and(|last| is_same_day(last, now))
    }

    /// Grant the daily reward unless it was already claimed on `now`'s UTC day.
    pub async fn claim_daily(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<DailyClaim, UserError> {
        let reward = self.config.daily_reward;
        let claimed_at = format_date(now);
        let stamp = claimed_at.clone();

        let record = self
            .store
            .update(
                user_id,
                Box::new(move |record| {
                    if Self::claimed_on(record, now) {
                        return Err(UserError::AlreadyClaimed);
                    }
                    record.tokens = record.tokens.saturating_add(reward);
                    record.daily_reward_claimed = true;
                    record.last_claimed = Some(stamp);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!(user_id, tokens = record.tokens, "Daily reward claimed");

        Ok(DailyClaim {
            tokens_awarded: reward,
            new_balance: record.tokens,
            claimed_at,
        })
    }

    /// A resource was submitted and awaits review.
    pub async fn record_pending_submission(&self, user_id: u64) -> Result<UserRecord, UserError> {
        self.store
            .update(
                user_id,
                Box::new(|record| {
                    record.submission_pending = record.submission_pending.saturating_add(1);
                    Ok(())
                }),
            )
            .await
    }

    /// A moderator approved one of the user's submissions.
    ///
    /// Returns the level change when the approval moved the user up.
    pub async fn record_approved_submission(
        &self,
        user_id: u64,
    ) -> Result<Option<LevelChange>, UserError> {
        let reward = self.config.submission_reward;
        let mut old_level = 0;

        let record = self
            .store
            .update(
                user_id,
                Box::new(|record| {
                    old_level = record.level;
                    record.submission_pending = (record.submission_pending - 1).max(0);
                    record.submission = record.submission.saturating_add(1);
                    record.tokens = record.tokens.saturating_add(reward);
                    // Never demote records whose level was set by an older version.
                    record.level = record
                        .level
                        .max(Self::level_for_submissions(record.submission));
                    Ok(())
                }),
            )
            .await?;

        if record.level > old_level {
            Ok(Some(LevelChange {
                user_id,
                old_level,
                new_level: record.level,
            }))
        } else {
            Ok(None)
        }
    }

    /// Remember which level-tier role the user now holds.
    pub async fn set_role(&self, user_id: u64, role: &str) -> Result<UserRecord, UserError> {
        let role = role.to_string();
        self.store
            .update(
                user_id,
                Box::new(move |record| {
                    record.roles = role;
                    Ok(())
                }),
            )
            .await
    }
}
