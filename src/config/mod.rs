pub mod schema;

pub use schema::{
    Config, DialogueConfig, ObservabilityConfig, STORAGE_BACKENDS, SchedulerConfig,
    StorageConfig,
};
