// Startup configuration, read once from the environment (after `.env`).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot token.")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Where the resource catalog lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Json { path: PathBuf },
    Sqlite { database: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub data_dir: PathBuf,
    pub users_file: PathBuf,
    pub storage: StorageBackend,
    pub link_probe_timeout: Duration,
    /// Publish commands to this guild only, so they show up immediately.
    pub guild_id: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let users_file = get("USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("users.json"));

        let storage = match get("STORAGE_BACKEND").as_deref().map(str::to_ascii_lowercase) {
            None => StorageBackend::Json {
                path: resources_file(&get, &data_dir),
            },
            Some(backend) if backend == "json" => StorageBackend::Json {
                path: resources_file(&get, &data_dir),
            },
            Some(backend) if backend == "sqlite" => StorageBackend::Sqlite {
                database: get("SQLITE_DATABASE").unwrap_or_else(|| {
                    data_dir.join("resources.db").to_string_lossy().into_owned()
                }),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: other,
                    reason: "expected `json` or `sqlite`",
                })
            }
        };

        let link_probe_timeout = match get("LINK_PROBE_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "LINK_PROBE_TIMEOUT_SECS",
                        value: raw,
                        reason: "expected a positive number of seconds",
                    })
                }
            },
        };

        let guild_id = match get("GUILD_ID") {
            None => None,
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "GUILD_ID",
                value: raw,
                reason: "expected a numeric guild id",
            })?),
        };

        Ok(Self {
            token,
            data_dir,
            users_file,
            storage,
            link_probe_timeout,
            guild_id,
        })
    }
}

fn resources_file(get: &impl Fn(&str) -> Option<String>, data_dir: &std::path::Path) -> PathBuf {
    get("RESOURCES_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("resources.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn token_is_required() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("DISCORD_TOKEN")));
        assert_eq!(
            config(&[("DISCORD_TOKEN", "  ")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn defaults() {
        let config = config(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.users_file, PathBuf::from("data").join("users.json"));
        assert_eq!(
            config.storage,
            StorageBackend::Json {
                path: PathBuf::from("data").join("resources.json")
            }
        );
        assert_eq!(config.link_probe_timeout, Duration::from_secs(10));
        assert_eq!(config.guild_id, None);
    }

    #[test]
    fn sqlite_backend_and_overrides() {
        let config = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("DATA_DIR", "/srv/bot"),
            ("STORAGE_BACKEND", "SQLite"),
            ("LINK_PROBE_TIMEOUT_SECS", "3"),
            ("GUILD_ID", "1234"),
        ])
        .unwrap();
        assert_eq!(config.users_file, PathBuf::from("/srv/bot/users.json"));
        assert_eq!(
            config.storage,
            StorageBackend::Sqlite {
                database: "/srv/bot/resources.db".to_string()
            }
        );
        assert_eq!(config.link_probe_timeout, Duration::from_secs(3));
        assert_eq!(config.guild_id, Some(1234));
    }

    #[test]
    fn unknown_backend_is_fatal() {
        let err = config(&[("DISCORD_TOKEN", "abc"), ("STORAGE_BACKEND", "mysql")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(config(&[("DISCORD_TOKEN", "a"), ("GUILD_ID", "abc")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "a"), ("LINK_PROBE_TIMEOUT_SECS", "0")]).is_err());
    }
}
