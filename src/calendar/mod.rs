pub mod clock;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use types::{
    CalendarDate, ClockTime, Entry, EntryDraft, EntryId, EntryKind, EntryPatch, NotificationRule,
};
