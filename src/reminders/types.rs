use crate::calendar::{EntryId, EntryKind};
use crate::store::{FiringChange, FiringKey};
use chrono::NaiveDateTime;

/// Tick cadence used when the config does not override it.
pub const DEFAULT_TICK_SECS: u64 = 60;
pub const MIN_TICK_SECS: u64 = 1;

/// One reminder due for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub entry_id: EntryId,
    pub kind: EntryKind,
    pub minutes_before: u32,
    pub occurrence: NaiveDateTime,
    pub title: String,
    pub body: String,
}

impl Reminder {
    pub fn key(&self) -> FiringKey {
        FiringKey::new(self.entry_id.clone(), self.minutes_before)
    }
}

/// Decisions for one tick, computed from a single snapshot before any write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickPlan {
    pub changes: Vec<FiringChange>,
    pub reminders: Vec<Reminder>,
    /// Entries whose stored date does not exist on the calendar.
    pub skipped: Vec<EntryId>,
}

impl TickPlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fired: Vec<Reminder>,
    pub pruned: usize,
    pub skipped: usize,
    /// Skipped entries reported for the first time by this scheduler.
    pub newly_skipped: usize,
}
