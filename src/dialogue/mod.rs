//! Conversational slot filling: kind → title → date → start → end → location.

pub mod controller;
pub mod emitter;
pub mod extract;
pub mod lexicon;
pub mod prompt;
pub mod session;
pub mod state;

pub use controller::{DialogueController, Turn};
pub use emitter::DraftEmitter;
pub use extract::{extract_date, extract_kind, extract_location, extract_time};
pub use lexicon::{ENGLISH, Lexicon, RelativeDay, SPANISH, SUPPORTED_LOCALES};
pub use prompt::Prompt;
pub use session::{SessionReply, Speaker, TranscriptLine, VoiceSession, capability_hint};
pub use state::ConversationState;
