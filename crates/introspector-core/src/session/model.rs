use crate::constants::session::{AHA_TRIGGER, RESOLUTION_MARKERS};
use crate::llm::{Message, Role};
use crate::prompt::Style;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Finalizing,
    Done,
}

/// One guided dialogue, from the opening haiku to finalization.
///
/// History is append-only. Assistant messages are appended only once their
/// stream has completed, so a partial reply never lands in the transcript.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    messages: Vec<Message>,
    style: Style,
    started_at: DateTime<Local>,
    opening_text: String,
    context: Option<String>,
    state: SessionState,
    resolution_signalled: bool,
}

impl Session {
    pub(crate) fn new(style: Style, context: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            style,
            started_at: Local::now(),
            opening_text: String::new(),
            context: context.filter(|c| !c.trim().is_empty()),
            state: SessionState::Idle,
            resolution_signalled: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// The opening haiku, empty until the opening stream has completed.
    pub fn opening_text(&self) -> &str {
        &self.opening_text
    }

    /// Context captured at session start and reused unchanged on every turn.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_opened(&self) -> bool {
        !self.opening_text.is_empty()
    }

    /// Whether the latest assistant reply offered to capture an insight.
    pub fn resolution_signalled(&self) -> bool {
        self.resolution_signalled
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn push_user(&mut self, content: &str) {
        self.messages.push(Message::user(content));
    }

    pub(crate) fn commit_opening(&mut self, text: String) {
        self.opening_text = text.clone();
        self.messages.push(Message::assistant(text));
        self.state = SessionState::Idle;
    }

    pub(crate) fn commit_reply(&mut self, text: String) {
        debug_assert!(matches!(self.last_message(), Some(m) if m.role == Role::User));
        self.resolution_signalled = signals_resolution(&text);
        self.messages.push(Message::assistant(text));
        self.state = SessionState::Idle;
    }
}

/// Crude resolution heuristic over the model's own reply: both "capture"
/// and "insight" appear, case-insensitively.
pub fn signals_resolution(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    RESOLUTION_MARKERS.iter().all(|marker| lower.contains(marker))
}

/// User input containing "aha" (case-insensitive) routes straight to finalize.
pub fn is_aha(input: &str) -> bool {
    input.to_lowercase().contains(AHA_TRIGGER)
}
