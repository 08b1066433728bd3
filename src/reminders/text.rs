use crate::calendar::{Entry, EntryKind};

/// Localised `(title, body)` for an entry's reminder.
pub fn reminder_text(entry: &Entry, locale: &str) -> (String, String) {
    let title_key = match entry.kind {
        EntryKind::Event => "reminder.title_event",
        EntryKind::Task => "reminder.title_task",
        EntryKind::Birthday => "reminder.title_birthday",
    };
    let title = t!(title_key, locale = locale).to_string();

    let body = match entry.start_time {
        Some(time) => t!(
            "reminder.body_at",
            locale = locale,
            title = entry.title.as_str(),
            time = time.to_string()
        ),
        None => t!("reminder.body_today", locale = locale, title = entry.title.as_str()),
    }
    .to_string();

    (title, body)
}
