//! Utterance extractors: pure functions from free text to a normalised slot
//! value, or `None` when nothing usable was said.

use super::lexicon::{Lexicon, RelativeDay};
use crate::calendar::{CalendarDate, ClockTime, EntryKind};
use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("valid full date regex"));
static SHORT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})").expect("valid short date regex"));
static BARE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").expect("valid bare day regex"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):?(\d{2})?").expect("valid time regex"));

const DAY_RANGE: std::ops::RangeInclusive<u32> = 1..=31;
const MONTH_RANGE: std::ops::RangeInclusive<u32> = 1..=12;

pub fn extract_kind(text: &str, lexicon: &Lexicon) -> Option<EntryKind> {
    lexicon.match_kind(&text.to_lowercase())
}

/// Resolves a date utterance against `reference` (today).
///
/// First matching rule wins: `D/M/YYYY`, then `D/M` in the reference year,
/// then a today/tomorrow keyword, then a bare day number in the reference
/// month. A day outside `1..=31` (or a month outside `1..=12`) rejects the
/// utterance outright instead of falling through to a later rule.
pub fn extract_date(text: &str, lexicon: &Lexicon, reference: NaiveDate) -> Option<CalendarDate> {
    if let Some(caps) = FULL_DATE.captures(text) {
        let day = number(caps.get(1)?.as_str())?;
        let month = number(caps.get(2)?.as_str())?;
        let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
        return checked(year, month, day);
    }

    if let Some(caps) = SHORT_DATE.captures(text) {
        let day = number(caps.get(1)?.as_str())?;
        let month = number(caps.get(2)?.as_str())?;
        return checked(reference.year(), month, day);
    }

    match lexicon.match_relative_day(&text.to_lowercase()) {
        Some(RelativeDay::Today) => return Some(reference.into()),
        Some(RelativeDay::Tomorrow) => {
            return reference.checked_add_days(Days::new(1)).map(Into::into);
        }
        None => {}
    }

    let caps = BARE_DAY.captures(text)?;
    let day = number(caps.get(1)?.as_str())?;
    checked(reference.year(), reference.month(), day)
}

/// Hour (1-2 digits) optionally followed by `MM` or `:MM`; minutes default
/// to zero, so `1430` reads as 14:30.
pub fn extract_time(text: &str) -> Option<ClockTime> {
    let caps = TIME.captures(text)?;
    let hour = number(caps.get(1)?.as_str())?;
    let minute = match caps.get(2) {
        Some(m) => number(m.as_str())?,
        None => 0,
    };
    ClockTime::new(hour, minute)
}

/// `None` when the utterance asks to skip the location, otherwise the raw
/// utterance as the location.
pub fn extract_location(text: &str, lexicon: &Lexicon) -> Option<String> {
    if lexicon.is_skip(&text.to_lowercase()) {
        None
    } else {
        Some(text.to_string())
    }
}

fn number(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok()
}

fn checked(year: i32, month: u32, day: u32) -> Option<CalendarDate> {
    if !DAY_RANGE.contains(&day) || !MONTH_RANGE.contains(&month) {
        return None;
    }
    Some(CalendarDate::new(year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::lexicon::{ENGLISH, SPANISH};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn full_date_wins_regardless_of_reference() {
        assert_eq!(
            extract_date("25/12/2024", &SPANISH, reference()),
            Some(CalendarDate::new(2024, 12, 25))
        );
        assert_eq!(
            extract_date("el 3/4/2031 por la tarde", &SPANISH, reference()),
            Some(CalendarDate::new(2031, 4, 3))
        );
    }

    #[test]
    fn short_date_uses_reference_year() {
        assert_eq!(
            extract_date("5/6", &SPANISH, reference()),
            Some(CalendarDate::new(2024, 6, 5))
        );
    }

    #[test]
    fn relative_keywords_resolve_against_reference() {
        assert_eq!(
            extract_date("mañana", &SPANISH, reference()),
            Some(CalendarDate::new(2024, 1, 2))
        );
        assert_eq!(
            extract_date("Hoy", &SPANISH, reference()),
            Some(CalendarDate::new(2024, 1, 1))
        );
        assert_eq!(
            extract_date("tomorrow please", &ENGLISH, reference()),
            Some(CalendarDate::new(2024, 1, 2))
        );
    }

    #[test]
    fn tomorrow_crosses_month_and_year_boundaries() {
        let new_years_eve = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(
            extract_date("mañana", &SPANISH, new_years_eve),
            Some(CalendarDate::new(2025, 1, 1))
        );
    }

    #[test]
    fn bare_day_uses_reference_month() {
        let reference = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(
            extract_date("el 15", &SPANISH, reference),
            Some(CalendarDate::new(2024, 2, 15))
        );
        // No overflow into March.
        assert_eq!(
            extract_date("31", &SPANISH, reference),
            Some(CalendarDate::new(2024, 2, 31))
        );
    }

    #[test]
    fn out_of_range_days_are_rejected() {
        assert_eq!(extract_date("32", &SPANISH, reference()), None);
        assert_eq!(extract_date("0", &SPANISH, reference()), None);
        assert_eq!(extract_date("32/1/2024", &SPANISH, reference()), None);
        assert_eq!(extract_date("5/13", &SPANISH, reference()), None);
    }

    #[test]
    fn unrelated_text_is_no_match() {
        assert_eq!(extract_date("cuando puedas", &SPANISH, reference()), None);
    }

    #[test]
    fn times_are_zero_padded() {
        assert_eq!(extract_time("9").map(|t| t.to_string()).as_deref(), Some("09:00"));
        assert_eq!(extract_time("14:30").map(|t| t.to_string()).as_deref(), Some("14:30"));
        assert_eq!(
            extract_time("a las 7:05 de la tarde").map(|t| t.to_string()).as_deref(),
            Some("07:05")
        );
        assert_eq!(extract_time("1430").map(|t| t.to_string()).as_deref(), Some("14:30"));
        assert_eq!(extract_time("0915").map(|t| t.to_string()).as_deref(), Some("09:15"));
    }

    #[test]
    fn invalid_times_are_rejected() {
        assert_eq!(extract_time("25:00"), None);
        assert_eq!(extract_time("10:75"), None);
        assert_eq!(extract_time("sin hora"), None);
    }

    #[test]
    fn skip_words_clear_the_location() {
        assert_eq!(extract_location("sin ubicación", &SPANISH), None);
        assert_eq!(extract_location("Saltar", &SPANISH), None);
        assert_eq!(extract_location("skip", &ENGLISH), None);
        assert_eq!(
            extract_location("Oficina central", &SPANISH).as_deref(),
            Some("Oficina central")
        );
    }

    #[test]
    fn kind_matching_is_case_insensitive() {
        assert_eq!(extract_kind("Un EVENTO", &SPANISH), Some(EntryKind::Event));
        assert_eq!(extract_kind("a Task", &ENGLISH), Some(EntryKind::Task));
        assert_eq!(extract_kind("algo", &SPANISH), None);
    }
}
