#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;

use voxplan::calendar::{
    CalendarDate, ClockTime, Entry, EntryId, EntryKind, FixedClock, NotificationRule,
};
use voxplan::reminders::{CollectingSink, NotificationScheduler};
use voxplan::store::{EntryStore, FiringRecordStore};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid test timestamp")
}

pub fn meeting(id: &str, date: CalendarDate, start: Option<ClockTime>, rules: &[u32]) -> Entry {
    Entry {
        id: EntryId::from(id),
        kind: EntryKind::Event,
        title: "Reunión".into(),
        date,
        start_time: start,
        end_time: None,
        location: None,
        notifications: rules
            .iter()
            .copied()
            .map(NotificationRule::minutes_before)
            .collect(),
        created_at: Utc::now(),
    }
}

pub struct SchedulerRig {
    pub clock: Arc<FixedClock>,
    pub sink: Arc<CollectingSink>,
    pub scheduler: NotificationScheduler,
}

pub fn rig(
    entries: Arc<dyn EntryStore>,
    firings: Arc<dyn FiringRecordStore>,
    now: NaiveDateTime,
    locale: &str,
) -> SchedulerRig {
    let clock = Arc::new(FixedClock::new(now));
    let sink = Arc::new(CollectingSink::new());
    let scheduler = NotificationScheduler::new(entries, firings, sink.clone(), clock.clone())
        .with_locale(locale);
    SchedulerRig {
        clock,
        sink,
        scheduler,
    }
}
