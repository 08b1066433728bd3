use crate::calendar::EntryKind;

/// Assistant utterances. Rendered through the locale tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Greeting,
    RepeatKind,
    AskTitle(EntryKind),
    AskDate,
    RepeatDate,
    AskStartTime,
    AskEndTime,
    RepeatTime,
    AskLocation,
    Complete,
    AlreadyComplete,
}

impl Prompt {
    pub fn key(self) -> &'static str {
        match self {
            Self::Greeting => "dialogue.greeting",
            Self::RepeatKind => "dialogue.repeat_kind",
            Self::AskTitle(EntryKind::Event) => "dialogue.ask_title_event",
            Self::AskTitle(EntryKind::Task) => "dialogue.ask_title_task",
            Self::AskTitle(EntryKind::Birthday) => "dialogue.ask_title_birthday",
            Self::AskDate => "dialogue.ask_date",
            Self::RepeatDate => "dialogue.repeat_date",
            Self::AskStartTime => "dialogue.ask_start_time",
            Self::AskEndTime => "dialogue.ask_end_time",
            Self::RepeatTime => "dialogue.repeat_time",
            Self::AskLocation => "dialogue.ask_location",
            Self::Complete => "dialogue.complete",
            Self::AlreadyComplete => "dialogue.already_complete",
        }
    }

    pub fn render(self, locale: &str) -> String {
        t!(self.key(), locale = locale).to_string()
    }

    /// Whether this prompt repeats a question after unrecognised input.
    pub fn is_reprompt(self) -> bool {
        matches!(self, Self::RepeatKind | Self::RepeatDate | Self::RepeatTime)
    }
}
