// User progression: records, rewards, and level-tier roles.

pub mod level_roles;
pub mod user_models;
pub mod user_service;

pub use level_roles::{sync_level_role, tier_for_level, RoleTier, ROLE_TIERS};
pub use user_models::{DailyClaim, LevelChange, UserRecord};
pub use user_service::{RecordUpdate, RewardConfig, UserError, UserService, UserStore};
