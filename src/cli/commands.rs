use clap::{Args, Parser, Subcommand};
use voxplan::calendar::{CalendarDate, ClockTime, EntryPatch, NotificationRule};

/// `voxplan` - voice-first calendar assistant.
#[derive(Parser, Debug)]
#[command(name = "voxplan")]
#[command(version)]
#[command(
    about = "Create calendar entries by conversation and get reminded once.",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Talk to the assistant on stdin; reminders are printed while you type
    Chat,

    /// Run only the reminder scheduler until Ctrl+C
    Daemon,

    /// Inspect and edit stored entries
    Entries {
        #[command(subcommand)]
        entry_command: EntryCommands,
    },

    /// Evaluate reminders once and exit
    RemindOnce,

    /// Show configuration and component health
    Status {
        /// Print the health snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum EntryCommands {
    /// List all entries in creation order
    List,
    /// Remove an entry
    Remove {
        /// Entry ID
        id: String,
    },
    /// Copy an entry under a new ID
    Duplicate {
        /// Entry ID
        id: String,
    },
    /// Change fields of an entry; moving its date or start re-arms reminders
    Edit {
        /// Entry ID
        id: String,
        #[command(flatten)]
        changes: EntryEdit,
    },
    /// Find entries whose title or location contains the query
    Search {
        /// Text to look for (case-insensitive)
        query: String,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEdit {
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<CalendarDate>,
    /// New start time as HH:MM
    #[arg(long)]
    pub start: Option<ClockTime>,
    /// New end time as HH:MM
    #[arg(long)]
    pub end: Option<ClockTime>,
    /// New location; an empty value removes it
    #[arg(long)]
    pub location: Option<String>,
    /// Replace reminders with these offsets in minutes (repeatable)
    #[arg(long = "remind", value_name = "MINUTES")]
    pub remind: Vec<u32>,
    /// Remove every reminder
    #[arg(long, conflicts_with = "remind")]
    pub no_reminders: bool,
}

impl EntryEdit {
    pub fn into_patch(self) -> EntryPatch {
        let notifications = if self.no_reminders {
            Some(Vec::new())
        } else if self.remind.is_empty() {
            None
        } else {
            Some(
                self.remind
                    .into_iter()
                    .map(NotificationRule::minutes_before)
                    .collect(),
            )
        };

        EntryPatch {
            title: self.title,
            date: self.date,
            start_time: self.start,
            end_time: self.end,
            location: self.location,
            notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, EntryCommands};
    use voxplan::calendar::{CalendarDate, ClockTime, NotificationRule};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn entries_subcommand_parses_id() {
        let cli = Cli::try_parse_from(["voxplan", "entries", "remove", "abc"]).unwrap();
        match cli.command {
            Commands::Entries { entry_command } => {
                assert_eq!(entry_command, EntryCommands::Remove { id: "abc".into() });
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn entries_edit_builds_a_patch() {
        let cli = Cli::try_parse_from([
            "voxplan", "entries", "edit", "abc", "--date", "2024-05-10", "--start", "14:30",
            "--remind", "30", "--remind", "5",
        ])
        .unwrap();
        let Commands::Entries {
            entry_command: EntryCommands::Edit { id, changes },
        } = cli.command
        else {
            panic!("expected entries edit");
        };
        assert_eq!(id, "abc");

        let patch = changes.into_patch();
        assert_eq!(patch.date, Some(CalendarDate::new(2024, 5, 10)));
        assert_eq!(patch.start_time, ClockTime::new(14, 30));
        assert_eq!(patch.title, None);
        assert_eq!(
            patch.notifications,
            Some(vec![
                NotificationRule::minutes_before(30),
                NotificationRule::minutes_before(5)
            ])
        );
    }

    #[test]
    fn entries_edit_rejects_bad_values() {
        for args in [
            ["voxplan", "entries", "edit", "abc", "--date", "2024-13-01"],
            ["voxplan", "entries", "edit", "abc", "--start", "25:00"],
        ] {
            assert!(Cli::try_parse_from(args).is_err());
        }
        assert!(
            Cli::try_parse_from([
                "voxplan", "entries", "edit", "abc", "--remind", "5", "--no-reminders"
            ])
            .is_err()
        );
    }

    #[test]
    fn chat_takes_no_speech_flag() {
        assert!(matches!(
            Cli::try_parse_from(["voxplan", "chat"]).unwrap().command,
            Commands::Chat
        ));
        assert!(Cli::try_parse_from(["voxplan", "chat", "--listen"]).is_err());
    }

    #[test]
    fn entries_search_takes_a_query() {
        let cli = Cli::try_parse_from(["voxplan", "entries", "search", "dentista"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Entries {
                entry_command: EntryCommands::Search { query }
            } if query == "dentista"
        ));
    }
}
