use super::Config;
use std::path::PathBuf;

impl Config {
    /// `VOXPLAN_LANG` is read by locale detection, not here.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(workspace) = std::env::var("VOXPLAN_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = PathBuf::from(workspace);
        }

        if let Ok(tick_str) = std::env::var("VOXPLAN_TICK_SECS")
            && let Ok(tick) = tick_str.trim().parse::<u64>()
        {
            self.scheduler.tick_secs = tick;
        }

        if let Ok(backend) = std::env::var("VOXPLAN_STORAGE")
            && !backend.is_empty()
        {
            self.storage.backend = backend.trim().to_lowercase();
        }

        if let Ok(level) = std::env::var("VOXPLAN_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level.trim().to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::with_env;
    use super::*;

    #[test]
    fn env_overrides_replace_file_values() {
        let config = with_env(|env| {
            env.set("VOXPLAN_WORKSPACE", "/tmp/voxplan-ws")
                .set("VOXPLAN_TICK_SECS", "5")
                .set("VOXPLAN_STORAGE", "Memory")
                .set("VOXPLAN_LOG", "debug");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        });

        assert_eq!(config.workspace_dir, PathBuf::from("/tmp/voxplan-ws"));
        assert_eq!(config.scheduler.tick_secs, 5);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn unparseable_tick_is_ignored() {
        let mut config = Config::default();
        let workspace = config.workspace_dir.clone();
        with_env(|env| {
            env.set("VOXPLAN_TICK_SECS", "soon").set("VOXPLAN_WORKSPACE", "");
            config.apply_env_overrides();
        });

        assert_eq!(config.scheduler.tick_secs, 60);
        assert_eq!(config.workspace_dir, workspace);
    }
}
