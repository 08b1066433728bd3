use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `voxplan`.
///
/// Unrecognised user input is never an error: the dialogue re-prompts in
/// place. What remains are configuration problems, unavailable speech
/// capabilities, and store failures seen by the reminder scheduler. Internal
/// code continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum VoxError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Speech capability ───────────────────────────────────────────────
    #[error("speech: {0}")]
    Capability(#[from] CapabilityError),

    // ── Reminder scheduler ──────────────────────────────────────────────
    #[error("scheduler: {0}")]
    Scheduler(#[from] SchedulerError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Speech capability errors ───────────────────────────────────────────────

/// Speech recognition could not run. The caller may continue with text input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("speech capability failed: {0}")]
    Failed(String),
}

// ─── Scheduler errors ───────────────────────────────────────────────────────

/// A tick that could not complete. The tick is skipped in full and retried on
/// the next interval; no reminder from it was emitted.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("entry store read failed: {0}")]
    EntryRead(String),

    #[error("firing record read failed: {0}")]
    FiringRead(String),

    #[error("firing record write failed: {0}")]
    FiringWrite(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, VoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = VoxError::Config(ConfigError::Validation("unknown storage backend".into()));
        assert!(err.to_string().contains("validation failed"));
        assert!(err.to_string().contains("unknown storage backend"));
    }

    #[test]
    fn capability_error_is_distinct_from_other_failures() {
        let err: VoxError = CapabilityError::PermissionDenied.into();
        assert!(matches!(
            err,
            VoxError::Capability(CapabilityError::PermissionDenied)
        ));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let vox_err: VoxError = anyhow_err.into();
        assert!(vox_err.to_string().contains("something went wrong"));
    }

    #[test]
    fn scheduler_error_names_the_failed_side() {
        let err = VoxError::Scheduler(SchedulerError::FiringWrite("disk full".into()));
        assert_eq!(err.to_string(), "scheduler: firing record write failed: disk full");
    }
}
