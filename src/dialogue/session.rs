use super::controller::DialogueController;
use super::emitter::DraftEmitter;
use crate::calendar::{EntryDraft, EntryId};
use crate::error::{CapabilityError, Result, VoxError};
use crate::speech::{SpeechEvent, SpeechInput, SpeechOutput};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Assistant,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReply {
    pub prompt: String,
    pub draft: Option<EntryDraft>,
    pub created: Option<EntryId>,
}

/// Wires the dialogue controller to speech output and the draft emitter.
///
/// Utterances are handled strictly one at a time; `&mut self` on every
/// entry point enforces that no two turns overlap.
pub struct VoiceSession {
    controller: DialogueController,
    emitter: DraftEmitter,
    speaker: Arc<dyn SpeechOutput>,
    transcript: Vec<TranscriptLine>,
}

impl VoiceSession {
    pub fn new(
        controller: DialogueController,
        emitter: DraftEmitter,
        speaker: Arc<dyn SpeechOutput>,
    ) -> Self {
        Self {
            controller,
            emitter,
            speaker,
            transcript: Vec::new(),
        }
    }

    pub fn controller(&self) -> &DialogueController {
        &self.controller
    }

    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    /// Starts (or restarts) the conversation with the greeting prompt.
    pub fn open(&mut self) -> String {
        self.controller.reset();
        self.transcript.clear();
        let greeting = self.controller.greeting();
        self.say(&greeting);
        greeting
    }

    pub async fn handle_utterance(&mut self, raw: &str) -> Result<SessionReply> {
        self.transcript.push(TranscriptLine {
            speaker: Speaker::User,
            text: raw.to_string(),
        });

        let turn = self.controller.submit_utterance(raw);
        self.say(&turn.text);

        let created = if turn.draft.is_some() {
            self.flush().await?
        } else {
            None
        };

        Ok(SessionReply {
            prompt: turn.text,
            draft: turn.draft,
            created,
        })
    }

    /// Emits a completed draft that is still held by the controller, e.g.
    /// after an earlier store failure.
    pub async fn flush(&mut self) -> Result<Option<EntryId>> {
        let created = self.emitter.emit(&mut self.controller).await?;
        if created.is_some() {
            self.transcript.clear();
            crate::diagnostics::health::mark_component_ok("dialogue");
        }
        Ok(created)
    }

    /// Feeds recognised transcripts into the dialogue until the recogniser
    /// ends. Capability failures surface as [`VoxError::Capability`]; the
    /// dialogue state is left as it was so typing can continue.
    pub async fn listen(&mut self, input: &mut dyn SpeechInput) -> Result<Vec<SessionReply>> {
        if let Err(err) = input.start() {
            crate::diagnostics::health::mark_component_error("speech", &err);
            tracing::warn!(recogniser = input.name(), "speech capture unavailable: {err}");
            return Err(err.into());
        }
        crate::diagnostics::health::mark_component_ok("speech");

        let mut replies = Vec::new();
        loop {
            match input.next_event().await {
                SpeechEvent::Transcript(text) => {
                    replies.push(self.handle_utterance(&text).await?);
                }
                SpeechEvent::Error(err) => {
                    input.stop();
                    crate::diagnostics::health::mark_component_error("speech", &err);
                    return Err(VoxError::Capability(err));
                }
                SpeechEvent::Ended => break,
            }
        }
        input.stop();
        Ok(replies)
    }

    fn say(&mut self, text: &str) {
        if let Err(err) = self.speaker.speak(text, self.controller.locale()) {
            tracing::debug!("speech output failed: {err}");
        }
        self.transcript.push(TranscriptLine {
            speaker: Speaker::Assistant,
            text: text.to_string(),
        });
    }
}

/// Localised hint for a capability failure, shown before falling back to text.
pub fn capability_hint(err: &CapabilityError, locale: &str) -> String {
    match err {
        CapabilityError::PermissionDenied => t!("speech.permission_denied", locale = locale),
        CapabilityError::Unsupported | CapabilityError::Failed(_) => {
            t!("speech.unsupported", locale = locale)
        }
    }
    .to_string()
}
