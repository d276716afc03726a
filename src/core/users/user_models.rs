// Per-user progression record, persisted as one entry of the users file.
//
// The file format predates this crate and several versions wrote it with
// different shapes, so deserialization is deliberately forgiving: missing
// fields fall back to the first-creation defaults and the two "daily" fields
// accept every type they have ever been stored as.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub submission: i64,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub submission_pending: i64,
    /// Name of the level-tier role last assigned, empty when none.
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub tokens: i64,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub daily_reward_claimed: bool,
    /// ISO-8601 timestamp of the last daily claim.
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub last_claimed: Option<String>,
}

fn default_level() -> i64 {
    1
}

impl UserRecord {
    /// The record synthesized on first access.
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            submission: 0,
            level: default_level(),
            submission_pending: 0,
            roles: String::new(),
            tokens: 0,
            daily_reward_claimed: false,
            last_claimed: None,
        }
    }
}

/// `true`/`false`, `""` (unset), `"true"`, or null.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        _ => false,
    })
}

/// A timestamp string, or one of the placeholders older versions wrote
/// (`false`, `""`, null), all meaning "never".
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Outcome of a successful daily claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyClaim {
    pub tokens_awarded: i64,
    pub new_balance: i64,
    pub claimed_at: String,
}

/// Returned when an approved submission moved a user to a new level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChange {
    pub user_id: u64,
    pub old_level: i64,
    pub new_level: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_documented_defaults() {
        let record = UserRecord::new(42);
        assert_eq!(record.user_id, "42");
        assert_eq!(record.level, 1);
        assert_eq!(record.tokens, 0);
        assert_eq!(record.submission, 0);
        assert_eq!(record.submission_pending, 0);
        assert!(record.roles.is_empty());
        assert!(!record.daily_reward_claimed);
        assert!(record.last_claimed.is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(UserRecord::new(7)).unwrap();
        assert_eq!(json["userId"], "7");
        assert_eq!(json["submissionPending"], 0);
        assert_eq!(json["dailyRewardClaimed"], false);
        assert!(json["lastClaimed"].is_null());
    }

    #[test]
    fn reads_legacy_shapes() {
        // The oldest writer swapped the placeholder types of the daily fields.
        let legacy = r#"{
            "userId": "9",
            "submission": 2,
            "level": 3,
            "submissionPending": 0,
            "roles": "",
            "tokens": 15,
            "dailyRewardClaimed": "",
            "lastClaimed": false
        }"#;
        let record: UserRecord = serde_json::from_str(legacy).unwrap();
        assert_eq!(record.level, 3);
        assert_eq!(record.tokens, 15);
        assert!(!record.daily_reward_claimed);
        assert!(record.last_claimed.is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let record: UserRecord = serde_json::from_str(r#"{"userId": "5", "tokens": 3}"#).unwrap();
        assert_eq!(record.level, 1);
        assert_eq!(record.tokens, 3);
        assert_eq!(record.submission, 0);
    }

    #[test]
    fn reads_current_shape() {
        let current = r#"{"userId":"1","dailyRewardClaimed":true,"lastClaimed":"2024-05-01T09:00:00.000Z"}"#;
        let record: UserRecord = serde_json::from_str(current).unwrap();
        assert!(record.daily_reward_claimed);
        assert_eq!(record.last_claimed.as_deref(), Some("2024-05-01T09:00:00.000Z"));
    }
}
