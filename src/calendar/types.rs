use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category of a calendar entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    Event,
    Task,
    Birthday,
}

/// Year/month/day exactly as extracted from an utterance.
///
/// Not normalised: `31` spoken in February stays `YYYY-02-31`. Use
/// [`CalendarDate::to_naive`] to check whether the day exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn at(self, time: ClockTime) -> Option<NaiveDateTime> {
        let time = NaiveTime::from_hms_opt(u32::from(time.hour), u32::from(time.minute), 0)?;
        Some(self.to_naive()?.and_time(time))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month(), date.day())
    }
}

impl std::str::FromStr for CalendarDate {
    type Err = String;

    /// Parses `YYYY-MM-DD`. Month and day are range-checked the same way the
    /// dialogue does (`1..=12`, `1..=31`) but not against the month length.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.trim().splitn(3, '-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected YYYY-MM-DD, got: {raw}"));
        };
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("invalid year in date: {raw}"))?;
        let month = month
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| format!("invalid month in date: {raw}"))?;
        let day = day
            .parse::<u32>()
            .ok()
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| format!("invalid day in date: {raw}"))?;
        Ok(Self::new(year, month, day))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Wall-clock time of day, always rendered as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Returns `None` unless `hour` is `0..=23` and `minute` is `0..=59`.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            hour: u8::try_from(hour).ok()?,
            minute: u8::try_from(minute).ok()?,
        })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl std::str::FromStr for ClockTime {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::try_from(raw.trim().to_string())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let (hour, minute) = raw
            .split_once(':')
            .ok_or_else(|| format!("invalid clock time: {raw}"))?;
        let hour = hour
            .parse::<u32>()
            .map_err(|_| format!("invalid hour in clock time: {raw}"))?;
        let minute = minute
            .parse::<u32>()
            .map_err(|_| format!("invalid minute in clock time: {raw}"))?;
        Self::new(hour, minute).ok_or_else(|| format!("clock time out of range: {raw}"))
    }
}

/// Stable identifier assigned by the entry store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for EntryId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully collected dialogue result, ready to hand to the entry store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub title: String,
    pub date: CalendarDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub location: Option<String>,
}

/// Fire a reminder this many minutes before the entry's occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationRule {
    pub minutes_before: u32,
}

impl NotificationRule {
    pub const fn minutes_before(minutes_before: u32) -> Self {
        Self { minutes_before }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub title: String,
    pub date: CalendarDate,
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    pub location: Option<String>,
    #[serde(default)]
    pub notifications: Vec<NotificationRule>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn from_draft(id: EntryId, draft: &EntryDraft, notifications: &[NotificationRule]) -> Self {
        Self {
            id,
            kind: draft.kind,
            title: draft.title.clone(),
            date: draft.date,
            start_time: Some(draft.start_time),
            end_time: Some(draft.end_time),
            location: draft.location.clone(),
            notifications: notifications.to_vec(),
            created_at: Utc::now(),
        }
    }

    /// The instant reminders key off: date plus start time, or midnight for
    /// all-day entries. `None` when the stored date does not exist.
    pub fn occurrence(&self) -> Option<NaiveDateTime> {
        self.date
            .at(self.start_time.unwrap_or(ClockTime::MIDNIGHT))
    }

    /// Case-insensitive substring match on title and location.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self
                .location
                .as_deref()
                .is_some_and(|location| location.to_lowercase().contains(&query))
    }
}

/// Field-level edit of a stored entry. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub date: Option<CalendarDate>,
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    pub location: Option<String>,
    pub notifications: Option<Vec<NotificationRule>>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether applying the patch can move the entry's occurrence, which
    /// invalidates reminders already fired for it.
    pub fn reschedules(&self) -> bool {
        self.date.is_some() || self.start_time.is_some()
    }

    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(title) = &self.title {
            entry.title.clone_from(title);
        }
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(start) = self.start_time {
            entry.start_time = Some(start);
        }
        if let Some(end) = self.end_time {
            entry.end_time = Some(end);
        }
        if let Some(location) = &self.location {
            entry.location = Some(location.clone()).filter(|l| !l.trim().is_empty());
        }
        if let Some(notifications) = &self.notifications {
            entry.notifications.clone_from(notifications);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_is_zero_padded() {
        assert_eq!(ClockTime::new(9, 0).unwrap().to_string(), "09:00");
        assert_eq!(ClockTime::new(14, 30).unwrap().to_string(), "14:30");
    }

    #[test]
    fn clock_time_rejects_out_of_range() {
        assert!(ClockTime::new(24, 0).is_none());
        assert!(ClockTime::new(23, 60).is_none());
        assert!(ClockTime::new(23, 59).is_some());
    }

    #[test]
    fn clock_time_serializes_as_string() {
        let time = ClockTime::new(7, 5).unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"07:05\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }

    #[test]
    fn calendar_date_keeps_impossible_days() {
        let date = CalendarDate::new(2024, 2, 31);
        assert_eq!(date.to_string(), "2024-02-31");
        assert!(date.to_naive().is_none());
    }

    #[test]
    fn occurrence_defaults_to_midnight_without_start_time() {
        let draft = EntryDraft {
            kind: EntryKind::Birthday,
            title: "Ana".into(),
            date: CalendarDate::new(2024, 3, 10),
            start_time: ClockTime::new(9, 0).unwrap(),
            end_time: ClockTime::new(10, 0).unwrap(),
            location: None,
        };
        let mut entry = Entry::from_draft(EntryId::from("e1"), &draft, &[]);
        assert_eq!(
            entry.occurrence().unwrap().to_string(),
            "2024-03-10 09:00:00"
        );

        entry.start_time = None;
        assert_eq!(
            entry.occurrence().unwrap().to_string(),
            "2024-03-10 00:00:00"
        );
    }

    #[test]
    fn entry_kind_round_trips_through_strings() {
        assert_eq!(EntryKind::Birthday.to_string(), "birthday");
        assert_eq!("task".parse::<EntryKind>().unwrap(), EntryKind::Task);
    }

    fn sample() -> Entry {
        Entry {
            id: EntryId::from("e"),
            kind: EntryKind::Event,
            title: "Reunión de equipo".into(),
            date: CalendarDate::new(2024, 1, 2),
            start_time: ClockTime::new(9, 0),
            end_time: ClockTime::new(10, 0),
            location: Some("Oficina".into()),
            notifications: vec![NotificationRule::minutes_before(15)],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn calendar_date_parses_iso_form_without_normalising() {
        assert_eq!("2024-02-31".parse(), Ok(CalendarDate::new(2024, 2, 31)));
        assert!("2024-13-01".parse::<CalendarDate>().is_err());
        assert!("2024-01-32".parse::<CalendarDate>().is_err());
        assert!("mañana".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut entry = sample();
        let patch = EntryPatch {
            title: Some("Retro".into()),
            start_time: ClockTime::new(11, 30),
            ..EntryPatch::default()
        };
        assert!(patch.reschedules());
        patch.apply_to(&mut entry);

        assert_eq!(entry.title, "Retro");
        assert_eq!(entry.start_time, ClockTime::new(11, 30));
        assert_eq!(entry.end_time, ClockTime::new(10, 0));
        assert_eq!(entry.location.as_deref(), Some("Oficina"));
        assert!(EntryPatch::default().is_empty());
    }

    #[test]
    fn matches_title_or_location_ignoring_case() {
        let entry = sample();
        assert!(entry.matches("reunión"));
        assert!(entry.matches("OFICINA"));
        assert!(!entry.matches("gimnasio"));
    }
}
