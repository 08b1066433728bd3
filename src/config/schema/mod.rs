mod env_overrides;
mod loader;
mod locale;
#[cfg(test)]
mod test_env;
mod types;

pub use types::{
    Config, DialogueConfig, ObservabilityConfig, STORAGE_BACKENDS, SchedulerConfig,
    StorageConfig,
};
