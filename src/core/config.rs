/*!
 * Guard Configuration
 *
 * Numeric tunables and permission defaults supplied by the host.
 *
 * Sources, later ones overriding earlier ones:
 * - Built-in defaults (`core::limits`)
 * - JSON file (`GuardConfig::from_json_file`)
 * - Environment variables (`GuardConfig::apply_env`)
 */

use super::errors::GuardError;
use super::limits::{
    DEFAULT_AUDIT_DIR, DEFAULT_BACKUP_DIR, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_MINUTES,
    DEFAULT_GRID_CELL_SIZE, DEFAULT_MESSAGE_COOLDOWN_SECS, DEFAULT_PRIORITY_CEILING,
    DEFAULT_RETENTION_DAYS, MAX_CACHE_TTL_MINUTES, MAX_RETENTION_DAYS, SECS_PER_DAY,
};
use super::types::GuardResult;
use crate::permissions::policy::PermissionDefaults;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable names
pub const ENV_CONFIG_FILE: &str = "AREA_GUARD_CONFIG";
pub const ENV_CACHE_TTL_MINUTES: &str = "AREA_GUARD_CACHE_TTL_MINUTES";
pub const ENV_PRIORITY_CEILING: &str = "AREA_GUARD_PRIORITY_CEILING";
pub const ENV_RETENTION_DAYS: &str = "AREA_GUARD_RETENTION_DAYS";
pub const ENV_AUDIT_DIR: &str = "AREA_GUARD_AUDIT_DIR";
pub const ENV_BACKUP_DIR: &str = "AREA_GUARD_BACKUP_DIR";
pub const ENV_AREAS_FILE: &str = "AREA_GUARD_AREAS_FILE";

/// Guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Decision cache time-to-live (default: 5 minutes)
    pub cache_ttl_minutes: u64,

    /// Maximum cached decisions (default: 100k)
    pub cache_capacity: usize,

    /// Highest allowed area priority (default: 1000)
    pub priority_ceiling: u32,

    /// Region grid cell edge in blocks (default: 16)
    pub grid_cell_size: i32,

    /// Audit retention window (default: 30 days)
    pub retention_days: u64,

    /// Directory holding the audit tables
    pub audit_dir: PathBuf,

    /// Directory receiving timestamped backups on close
    pub backup_dir: PathBuf,

    /// Area snapshot file restored on start and saved on shutdown
    pub areas_file: Option<PathBuf>,

    /// Minimum gap between deny notifications per actor and area (default: 3s)
    pub message_cooldown_secs: u64,

    /// Global defaults and fallback policy
    pub permissions: PermissionDefaults,
}

impl GuardConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            priority_ceiling: DEFAULT_PRIORITY_CEILING,
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
            retention_days: DEFAULT_RETENTION_DAYS,
            audit_dir: PathBuf::from(DEFAULT_AUDIT_DIR),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            areas_file: None,
            message_cooldown_secs: DEFAULT_MESSAGE_COOLDOWN_SECS,
            permissions: PermissionDefaults::default(),
        }
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "Loaded guard configuration file");
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file named by `AREA_GUARD_CONFIG`, then env overrides
    pub fn from_env() -> GuardResult<Self> {
        let base = match std::env::var(ENV_CONFIG_FILE) {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::new(),
        };
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `AREA_GUARD_*` environment overrides
    pub fn apply_env(mut self) -> GuardResult<Self> {
        if let Some(v) = env_parse(ENV_CACHE_TTL_MINUTES)? {
            self.cache_ttl_minutes = v;
        }
        if let Some(v) = env_parse(ENV_PRIORITY_CEILING)? {
            self.priority_ceiling = v;
        }
        if let Some(v) = env_parse(ENV_RETENTION_DAYS)? {
            self.retention_days = v;
        }
        if let Ok(dir) = std::env::var(ENV_AUDIT_DIR) {
            self.audit_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(ENV_BACKUP_DIR) {
            self.backup_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var(ENV_AREAS_FILE) {
            self.areas_file = Some(PathBuf::from(file));
        }
        Ok(self)
    }

    /// Reject values that would disable a subsystem by accident
    pub fn validate(&self) -> GuardResult<()> {
        if self.cache_ttl_minutes == 0 {
            return Err(config_error("cache_ttl_minutes must be at least 1"));
        }
        if self.cache_ttl_minutes > MAX_CACHE_TTL_MINUTES {
            return Err(config_error("cache_ttl_minutes exceeds one year"));
        }
        if self.cache_capacity == 0 {
            return Err(config_error("cache_capacity must be at least 1"));
        }
        if self.grid_cell_size <= 0 {
            return Err(config_error("grid_cell_size must be positive"));
        }
        if self.retention_days == 0 {
            return Err(config_error("retention_days must be at least 1"));
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(config_error("retention_days exceeds 36500"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60))
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(SECS_PER_DAY))
    }

    pub fn message_cooldown(&self) -> Duration {
        Duration::from_secs(self.message_cooldown_secs)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn config_error(msg: &str) -> GuardError {
    GuardError::Configuration(msg.into())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> GuardResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GuardError::Configuration(format!("{key} is not a valid number: {raw}").into())),
        Err(_) => Ok(None),
    }
}
