//! Reminder evaluation and delivery.

pub mod scheduler;
pub mod sink;
pub mod text;
pub mod types;

pub use scheduler::{NotificationScheduler, plan_tick};
pub use sink::{CollectingSink, NotificationSink, StdoutSink, TracingSink};
pub use text::reminder_text;
pub use types::{DEFAULT_TICK_SECS, MIN_TICK_SECS, Reminder, TickPlan, TickReport};
