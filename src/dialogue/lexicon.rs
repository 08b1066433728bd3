use crate::calendar::EntryKind;

/// Relative day words recognised by the date extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
}

/// Per-locale keyword tables. All lookups are case-insensitive substring
/// matches against the lowercased utterance.
#[derive(Debug)]
pub struct Lexicon {
    pub locale: &'static str,
    kinds: &'static [(&'static str, EntryKind)],
    today: &'static [&'static str],
    tomorrow: &'static [&'static str],
    skip_location: &'static [&'static str],
}

pub static SPANISH: Lexicon = Lexicon {
    locale: "es",
    // "cumpleaño" also covers "cumpleaños".
    kinds: &[
        ("evento", EntryKind::Event),
        ("tarea", EntryKind::Task),
        ("cumpleaño", EntryKind::Birthday),
    ],
    today: &["hoy"],
    tomorrow: &["mañana"],
    skip_location: &["sin", "saltar", "no"],
};

pub static ENGLISH: Lexicon = Lexicon {
    locale: "en",
    kinds: &[
        ("event", EntryKind::Event),
        ("task", EntryKind::Task),
        ("birthday", EntryKind::Birthday),
    ],
    today: &["today"],
    tomorrow: &["tomorrow"],
    skip_location: &["none", "skip", "no"],
};

pub const SUPPORTED_LOCALES: &[&str] = &["es", "en"];

impl Lexicon {
    /// Unknown locales fall back to Spanish.
    pub fn for_locale(locale: &str) -> &'static Self {
        match locale {
            "en" => &ENGLISH,
            _ => &SPANISH,
        }
    }

    pub fn match_kind(&self, lowered: &str) -> Option<EntryKind> {
        self.kinds
            .iter()
            .find(|(word, _)| lowered.contains(word))
            .map(|(_, kind)| *kind)
    }

    pub fn match_relative_day(&self, lowered: &str) -> Option<RelativeDay> {
        if self.today.iter().any(|word| lowered.contains(word)) {
            Some(RelativeDay::Today)
        } else if self.tomorrow.iter().any(|word| lowered.contains(word)) {
            Some(RelativeDay::Tomorrow)
        } else {
            None
        }
    }

    pub fn is_skip(&self, lowered: &str) -> bool {
        self.skip_location.iter().any(|word| lowered.contains(word))
    }
}
