//! Health snapshot persisted next to `config.toml`, so a `voxplan status` run
//! can report on a `daemon` or `chat` process that is still running.

use super::health::{self, HealthSnapshot};
use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub const STATE_FILE_NAME: &str = "voxplan_state.json";
pub const STATE_FLUSH_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(flatten)]
    pub snapshot: HealthSnapshot,
    pub written_at: DateTime<Utc>,
}

pub fn state_file_path(config: &Config) -> PathBuf {
    config
        .config_path
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(STATE_FILE_NAME)
}

/// Writes this process's health snapshot to `path`. The file is replaced by
/// rename, so readers never see a partial write.
pub async fn write_state(path: &Path) -> Result<()> {
    let state = PersistedState {
        snapshot: health::snapshot(),
        written_at: Utc::now(),
    };
    let data = serde_json::to_vec_pretty(&state).context("serialize health state")?;
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, data)
        .await
        .with_context(|| format!("Failed to write state file: {}", staging.display()))?;
    tokio::fs::rename(&staging, path)
        .await
        .with_context(|| format!("Failed to replace state file: {}", path.display()))
}

/// Reads the last persisted snapshot. `Ok(None)` when no process has written
/// one yet.
pub async fn read_state(path: &Path) -> Result<Option<PersistedState>> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(error)
                .with_context(|| format!("Failed to read state file: {}", path.display()));
        }
    };
    let state = serde_json::from_slice(&data)
        .with_context(|| format!("Invalid state file: {}", path.display()))?;
    Ok(Some(state))
}

/// Rewrites the state file every [`STATE_FLUSH_SECS`] until the task is
/// aborted. Callers write once more after aborting to record the final state.
pub fn spawn_state_writer(config: Arc<Config>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let path = state_file_path(&config);
        if let Some(parent) = path.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!(%error, "failed to create state file directory");
        }

        let mut interval = tokio::time::interval(Duration::from_secs(STATE_FLUSH_SECS));
        loop {
            interval.tick().await;
            if let Err(error) = write_state(&path).await {
                tracing::warn!("{error:#}");
            }
        }
    })
}
