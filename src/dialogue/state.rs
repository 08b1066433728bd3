use crate::calendar::{CalendarDate, ClockTime, EntryDraft, EntryKind};

/// Which slot the dialogue is filling. Each case carries exactly the slots
/// collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Greeting,
    AwaitingTitle {
        kind: EntryKind,
    },
    AwaitingDate {
        kind: EntryKind,
        title: String,
    },
    AwaitingStartTime {
        kind: EntryKind,
        title: String,
        date: CalendarDate,
    },
    AwaitingEndTime {
        kind: EntryKind,
        title: String,
        date: CalendarDate,
        start_time: ClockTime,
    },
    AwaitingLocation {
        kind: EntryKind,
        title: String,
        date: CalendarDate,
        start_time: ClockTime,
        end_time: ClockTime,
    },
    Complete(EntryDraft),
}

impl ConversationState {
    pub fn step(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::AwaitingTitle { .. } => "title",
            Self::AwaitingDate { .. } => "date",
            Self::AwaitingStartTime { .. } => "start_time",
            Self::AwaitingEndTime { .. } => "end_time",
            Self::AwaitingLocation { .. } => "location",
            Self::Complete(_) => "complete",
        }
    }

    pub fn kind(&self) -> Option<EntryKind> {
        match self {
            Self::Greeting => None,
            Self::AwaitingTitle { kind }
            | Self::AwaitingDate { kind, .. }
            | Self::AwaitingStartTime { kind, .. }
            | Self::AwaitingEndTime { kind, .. }
            | Self::AwaitingLocation { kind, .. } => Some(*kind),
            Self::Complete(draft) => Some(draft.kind),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}
