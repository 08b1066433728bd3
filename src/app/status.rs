use voxplan::Config;
use voxplan::diagnostics::state::PersistedState;

/// `state` is the snapshot last persisted by a `daemon` or `chat` process.
pub fn render_status(config: &Config, state: Option<&PersistedState>) -> String {
    let reminders = if config.dialogue.default_reminders.is_empty() {
        t!("entries.no_reminders").to_string()
    } else {
        config
            .dialogue
            .default_reminders
            .iter()
            .map(|m| format!("-{m}m"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        format!("◆ {}", t!("status.title")),
        String::new(),
        format!("{}     {}", t!("status.version"), env!("CARGO_PKG_VERSION")),
        format!(
            "{}   {}",
            t!("status.workspace"),
            config.workspace_dir.display()
        ),
        format!(
            "{}      {}",
            t!("status.config"),
            config.config_path.display()
        ),
        String::new(),
        format!("  {}      {}", t!("status.locale"), config.resolved_locale()),
        format!("  {}  {}", t!("status.storage"), storage_line(config)),
        format!(
            "  {} {}s",
            t!("status.tick"),
            config.scheduler.tick_interval().as_secs()
        ),
        format!("  {} {}", t!("status.reminders"), reminders),
    ];

    lines.push(String::new());
    let Some(state) = state else {
        lines.push(format!("  {}", t!("status.no_state")));
        return lines.join("\n");
    };
    lines.push(format!(
        "  {}",
        t!(
            "status.last_state",
            at = state.written_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            pid = state.snapshot.pid
        )
    ));

    if !state.snapshot.components.is_empty() {
        lines.push(format!("  {}", t!("status.components")));
        for (name, component) in &state.snapshot.components {
            let mut line = format!("    {name:<10} {}", component.status);
            if let Some(err) = &component.last_error {
                line.push_str(&format!(" ({err})"));
            }
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn storage_line(config: &Config) -> String {
    if config.storage.backend == "sqlite" {
        format!("sqlite ({})", config.db_path().display())
    } else {
        config.storage.backend.clone()
    }
}
