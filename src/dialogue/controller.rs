use super::extract::{extract_date, extract_kind, extract_location, extract_time};
use super::lexicon::Lexicon;
use super::prompt::Prompt;
use super::state::ConversationState;
use crate::calendar::{Clock, EntryDraft};
use chrono::NaiveDate;
use std::sync::Arc;

/// Result of one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub prompt: Prompt,
    pub text: String,
    /// Present only on the turn that completes the draft.
    pub draft: Option<EntryDraft>,
}

impl Turn {
    pub fn reprompted(&self) -> bool {
        self.prompt.is_reprompt()
    }
}

/// Slot-filling state machine for one in-progress entry draft.
///
/// Valid input moves forward exactly one state; unrecognised input stays in
/// place and re-prompts. Once `Complete`, the controller answers every
/// utterance with [`Prompt::AlreadyComplete`] until [`reset`](Self::reset).
pub struct DialogueController {
    state: ConversationState,
    lexicon: &'static Lexicon,
    clock: Arc<dyn Clock>,
}

impl DialogueController {
    pub fn new(lexicon: &'static Lexicon, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: ConversationState::Greeting,
            lexicon,
            clock,
        }
    }

    pub fn for_locale(locale: &str, clock: Arc<dyn Clock>) -> Self {
        Self::new(Lexicon::for_locale(locale), clock)
    }

    pub fn locale(&self) -> &'static str {
        self.lexicon.locale
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn greeting(&self) -> String {
        Prompt::Greeting.render(self.locale())
    }

    /// The finished draft while in `Complete`.
    pub fn completed_draft(&self) -> Option<&EntryDraft> {
        match &self.state {
            ConversationState::Complete(draft) => Some(draft),
            _ => None,
        }
    }

    /// Discards any collected slots and returns to `Greeting`.
    pub fn reset(&mut self) {
        self.state = ConversationState::Greeting;
    }

    pub fn submit_utterance(&mut self, raw: &str) -> Turn {
        let today = self.clock.today();
        self.submit_utterance_on(raw, today)
    }

    /// Like [`submit_utterance`](Self::submit_utterance) with an explicit
    /// reference date for relative day words.
    pub fn submit_utterance_on(&mut self, raw: &str, today: NaiveDate) -> Turn {
        let current = std::mem::take(&mut self.state);
        let from = current.step();
        let (next, prompt, draft) = advance(current, raw, self.lexicon, today);

        tracing::debug!(
            from,
            to = next.step(),
            reprompt = prompt.is_reprompt(),
            "dialogue transition"
        );
        self.state = next;

        Turn {
            prompt,
            text: prompt.render(self.locale()),
            draft,
        }
    }
}

fn advance(
    state: ConversationState,
    raw: &str,
    lexicon: &Lexicon,
    today: NaiveDate,
) -> (ConversationState, Prompt, Option<EntryDraft>) {
    use ConversationState as S;

    match state {
        S::Greeting => match extract_kind(raw, lexicon) {
            Some(kind) => (S::AwaitingTitle { kind }, Prompt::AskTitle(kind), None),
            None => (S::Greeting, Prompt::RepeatKind, None),
        },
        S::AwaitingTitle { kind } => (
            S::AwaitingDate {
                kind,
                title: raw.to_string(),
            },
            Prompt::AskDate,
            None,
        ),
        S::AwaitingDate { kind, title } => match extract_date(raw, lexicon, today) {
            Some(date) => (
                S::AwaitingStartTime { kind, title, date },
                Prompt::AskStartTime,
                None,
            ),
            None => (S::AwaitingDate { kind, title }, Prompt::RepeatDate, None),
        },
        S::AwaitingStartTime { kind, title, date } => match extract_time(raw) {
            Some(start_time) => (
                S::AwaitingEndTime {
                    kind,
                    title,
                    date,
                    start_time,
                },
                Prompt::AskEndTime,
                None,
            ),
            None => (
                S::AwaitingStartTime { kind, title, date },
                Prompt::RepeatTime,
                None,
            ),
        },
        // End time is not checked against the start time.
        S::AwaitingEndTime {
            kind,
            title,
            date,
            start_time,
        } => match extract_time(raw) {
            Some(end_time) => (
                S::AwaitingLocation {
                    kind,
                    title,
                    date,
                    start_time,
                    end_time,
                },
                Prompt::AskLocation,
                None,
            ),
            None => (
                S::AwaitingEndTime {
                    kind,
                    title,
                    date,
                    start_time,
                },
                Prompt::RepeatTime,
                None,
            ),
        },
        S::AwaitingLocation {
            kind,
            title,
            date,
            start_time,
            end_time,
        } => {
            let draft = EntryDraft {
                kind,
                title,
                date,
                start_time,
                end_time,
                location: extract_location(raw, lexicon),
            };
            (
                S::Complete(draft.clone()),
                Prompt::Complete,
                Some(draft),
            )
        }
        S::Complete(draft) => (S::Complete(draft), Prompt::AlreadyComplete, None),
    }
}
