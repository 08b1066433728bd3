use crate::cli::commands::{Cli, Commands, EntryCommands};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use voxplan::Config;
use voxplan::calendar::SystemClock;
use voxplan::diagnostics::state::{self, PersistedState};
use voxplan::reminders::{NotificationScheduler, StdoutSink};
use voxplan::store::Stores;

use crate::app::status::render_status;

fn scheduler_for(config: &Config, stores: Stores) -> NotificationScheduler {
    NotificationScheduler::new(
        stores.entries,
        stores.firings,
        Arc::new(StdoutSink),
        Arc::new(SystemClock),
    )
    .with_locale(config.resolved_locale())
}

async fn run_daemon(config: Arc<Config>) -> Result<()> {
    let stores = Stores::open(&config).await?;
    let scheduler = scheduler_for(&config, stores);
    let every = config.scheduler.tick_interval();

    println!("◆ {}", t!("daemon.started"));
    println!("   {}", t!("daemon.stop_hint"));
    info!(tick_secs = every.as_secs(), "Starting reminder scheduler");

    let state_writer = state::spawn_state_writer(Arc::clone(&config));
    scheduler
        .run(every, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Ctrl+C handler unavailable: {e}");
            }
        })
        .await;

    voxplan::diagnostics::health::mark_component_error("scheduler", "shutdown requested");
    finish_state_writer(&config, state_writer).await;
    Ok(())
}

/// Stops the periodic writer and records the final health state.
pub(crate) async fn finish_state_writer(
    config: &Config,
    writer: tokio::task::JoinHandle<()>,
) {
    writer.abort();
    if let Err(e) = state::write_state(&state::state_file_path(config)).await {
        tracing::warn!("{e:#}");
    }
}

async fn load_state(config: &Config) -> Option<PersistedState> {
    match state::read_state(&state::state_file_path(config)).await {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("{e:#}");
            None
        }
    }
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Chat => crate::app::chat::run(config).await,

        Commands::Daemon => run_daemon(config).await,

        Commands::Entries { entry_command } => {
            let stores = Stores::open(&config).await?;
            let store = stores.entries.as_ref();
            match entry_command {
                EntryCommands::List => crate::app::entries::list(store).await,
                EntryCommands::Remove { id } => crate::app::entries::remove(store, &id).await,
                EntryCommands::Duplicate { id } => {
                    crate::app::entries::duplicate(store, &id).await
                }
                EntryCommands::Edit { id, changes } => {
                    crate::app::entries::edit(&stores, &id, &changes.into_patch())
                        .await
                        .map(drop)
                }
                EntryCommands::Search { query } => {
                    crate::app::entries::search(store, &query).await.map(drop)
                }
            }
        }

        Commands::RemindOnce => {
            let stores = Stores::open(&config).await?;
            let report = scheduler_for(&config, stores).tick().await?;
            println!("{}", t!("remind_once.fired", count = report.fired.len()));
            Ok(())
        }

        Commands::Status { json } => {
            let state = load_state(&config).await;
            if json {
                let value = match &state {
                    Some(state) => serde_json::to_value(state)?,
                    None => serde_json::json!({ "components": {} }),
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", render_status(&config, state.as_ref()));
            }
            Ok(())
        }
    }
}
