//! Speech capability boundary.
//!
//! Recognition and synthesis are opaque collaborators: recognisers hand over
//! finished transcripts, synthesisers take prompt text. Neither ever touches
//! dialogue state, so stopping capture mid-conversation leaves every collected
//! slot in place.

use crate::error::CapabilityError;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Transcript(String),
    Error(CapabilityError),
    Ended,
}

/// Single-session speech recogniser.
pub trait SpeechInput: Send {
    fn name(&self) -> &str;

    /// Begin capturing. `Unsupported` / `PermissionDenied` are reported here
    /// and never reach the dialogue.
    fn start(&mut self) -> Result<(), CapabilityError>;

    fn stop(&mut self);

    fn is_listening(&self) -> bool;

    /// Next recogniser event. Yields `Ended` once stopped or exhausted.
    fn next_event<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = SpeechEvent> + Send + 'a>>;
}

/// Best-effort prompt synthesis. Callers log and ignore failures.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str, locale: &str) -> Result<(), CapabilityError>;
}

/// Recogniser for platforms without speech support.
pub struct UnsupportedSpeechInput;

impl SpeechInput for UnsupportedSpeechInput {
    fn name(&self) -> &str {
        "unsupported"
    }

    fn start(&mut self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }

    fn stop(&mut self) {}

    fn is_listening(&self) -> bool {
        false
    }

    fn next_event<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = SpeechEvent> + Send + 'a>> {
        Box::pin(async { SpeechEvent::Ended })
    }
}

/// Replays a fixed list of transcripts, one per event.
pub struct ScriptedSpeechInput {
    pending: VecDeque<String>,
    listening: bool,
}

impl ScriptedSpeechInput {
    pub fn new<I, S>(transcripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: transcripts.into_iter().map(Into::into).collect(),
            listening: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl SpeechInput for ScriptedSpeechInput {
    fn name(&self) -> &str {
        "scripted"
    }

    fn start(&mut self) -> Result<(), CapabilityError> {
        self.listening = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn next_event<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = SpeechEvent> + Send + 'a>> {
        Box::pin(async move {
            if !self.listening {
                return SpeechEvent::Ended;
            }
            match self.pending.pop_front() {
                Some(text) => SpeechEvent::Transcript(text),
                None => {
                    self.listening = false;
                    SpeechEvent::Ended
                }
            }
        })
    }
}

/// Bridges an external recogniser that pushes events over a channel.
pub struct ChannelSpeechInput {
    rx: mpsc::Receiver<SpeechEvent>,
    listening: bool,
}

impl ChannelSpeechInput {
    pub fn new(rx: mpsc::Receiver<SpeechEvent>) -> Self {
        Self {
            rx,
            listening: false,
        }
    }
}

impl SpeechInput for ChannelSpeechInput {
    fn name(&self) -> &str {
        "channel"
    }

    fn start(&mut self) -> Result<(), CapabilityError> {
        self.listening = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn next_event<'a>(&'a mut self) -> Pin<Box<dyn Future<Output = SpeechEvent> + Send + 'a>> {
        Box::pin(async move {
            if !self.listening {
                return SpeechEvent::Ended;
            }
            match self.rx.recv().await {
                Some(event) => event,
                None => {
                    self.listening = false;
                    SpeechEvent::Ended
                }
            }
        })
    }
}

/// Synthesiser that drops every prompt.
pub struct SilentSpeechOutput;

impl SpeechOutput for SilentSpeechOutput {
    fn speak(&self, _text: &str, _locale: &str) -> Result<(), CapabilityError> {
        Ok(())
    }
}
