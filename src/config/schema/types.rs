use crate::calendar::NotificationRule;
use crate::error::ConfigError;
use crate::reminders::{DEFAULT_TICK_SECS, MIN_TICK_SECS};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub(super) const APP_DIR: &str = ".voxplan";
pub(super) const DEFAULT_LOCALE: &str = "es";

pub const STORAGE_BACKENDS: &[&str] = &["sqlite", "memory"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub dialogue: DialogueConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Minutes-before offsets attached to every entry the dialogue creates.
    #[serde(default = "default_reminders")]
    pub default_reminders: Vec<u32>,
}

fn default_reminders() -> Vec<u32> {
    vec![15]
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            default_reminders: default_reminders(),
        }
    }
}

impl DialogueConfig {
    pub fn notification_rules(&self) -> Vec<NotificationRule> {
        self.default_reminders
            .iter()
            .copied()
            .map(NotificationRule::minutes_before)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(MIN_TICK_SECS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "sqlite" | "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Database file name, relative to the workspace directory.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_storage_backend() -> String {
    "sqlite".into()
}

fn default_db_file() -> String {
    "voxplan.db".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            db_file: default_db_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ObservabilityConfig {
    pub fn level(&self) -> Option<tracing::Level> {
        tracing::Level::from_str(self.log_level.trim()).ok()
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let app_dir = home.join(APP_DIR);

        Self {
            workspace_dir: app_dir.join("workspace"),
            config_path: app_dir.join("config.toml"),
            locale: default_locale(),
            dialogue: DialogueConfig::default(),
            scheduler: SchedulerConfig::default(),
            storage: StorageConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !STORAGE_BACKENDS.contains(&self.storage.backend.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown storage backend '{}' (expected one of: {})",
                self.storage.backend,
                STORAGE_BACKENDS.join(", ")
            )));
        }

        if self.observability.level().is_none() {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.observability.log_level
            )));
        }

        if self.storage.db_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.db_file must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.workspace_dir.join(&self.storage.db_file)
    }
}
