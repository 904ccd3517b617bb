//! Services the engine consumes but does not implement: context lookup,
//! link existence checks and note persistence.

use crate::error::Result;
use crate::llm::Message;
use crate::prompt::Style;
use crate::summary::SummaryResult;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Supplies a human-readable block of recent note snippets. The engine
/// appends it verbatim to the system prompt and never parses it.
#[async_trait::async_trait]
pub trait ContextProvider: Send + Sync {
    async fn context(&self) -> Result<String>;
}

/// Answers whether a suggested link already points at an existing note.
#[async_trait::async_trait]
pub trait LinkExistenceChecker: Send + Sync {
    async fn exists(&self, candidate: &str) -> bool;
}

#[async_trait::async_trait]
impl<F> LinkExistenceChecker for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn exists(&self, candidate: &str) -> bool {
        (self)(candidate)
    }
}

/// Everything needed to write a captured session somewhere durable.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub summary: SummaryResult,
    pub opening_text: String,
    pub started_at: DateTime<Local>,
    pub style: Style,
    pub transcript: Vec<Message>,
}

impl NoteDraft {
    /// `YYYY-MM-DD` of the session start.
    pub fn date(&self) -> String {
        self.started_at.format("%Y-%m-%d").to_string()
    }
}

/// Writes a captured session and reports where it went.
#[async_trait::async_trait]
pub trait NotePersister: Send + Sync {
    async fn save(&self, draft: &NoteDraft) -> Result<PathBuf>;
}
