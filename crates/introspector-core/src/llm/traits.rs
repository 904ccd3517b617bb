use crate::error::{IntrospectError, Result};
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Events emitted by a backend while a streamed completion is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta(String),
    Done,
    Error(String),
}

/// A single completion request as the backends see it.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, messages: Vec<Message>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            messages,
            max_tokens,
        }
    }
}

/// Finite, forward-only sequence of text fragments for one model reply.
///
/// Yields `Ok(fragment)` in emission order and ends after the backend's
/// `Done` (or when the transport closes). A backend error is yielded once
/// as `Err(ProviderResponse)` and the stream is finished afterwards.
pub struct FragmentStream {
    inner: BoxStream<'static, StreamEvent>,
    finished: bool,
}

impl FragmentStream {
    pub fn from_events<S>(events: S) -> Self
    where
        S: Stream<Item = StreamEvent> + Send + 'static,
    {
        Self {
            inner: events.boxed(),
            finished: false,
        }
    }

    /// A stream that replays fixed fragments and then completes.
    pub fn from_fragments<I, T>(fragments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let events: Vec<StreamEvent> = fragments
            .into_iter()
            .map(|f| StreamEvent::TextDelta(f.into()))
            .chain(std::iter::once(StreamEvent::Done))
            .collect();
        Self::from_events(futures::stream::iter(events))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain the whole stream into one string.
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

impl Stream for FragmentStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        loop {
            match futures::ready!(self.inner.poll_next_unpin(cx)) {
                Some(StreamEvent::TextDelta(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(Ok(text)));
                }
                Some(StreamEvent::Error(err)) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(IntrospectError::ProviderResponse(err))));
                }
                Some(StreamEvent::Done) | None => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

/// One backend (direct or routed). Implementations are stateless apart from
/// credentials and model id.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Run a completion and return the full reply text.
    async fn chat(&self, request: &ChatRequest) -> Result<String>;

    /// Run a completion and stream the reply as it is produced.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream>;
}

/// The capability set the conversation engine needs from a provider.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Open a session: the system prompt plus a single synthetic user turn.
    async fn stream_start(&self, system_prompt: &str) -> Result<FragmentStream>;

    /// Continue a session with its full ordered history.
    async fn stream_continue(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<FragmentStream>;

    /// One non-streamed completion with the larger summary budget.
    async fn complete_summary(&self, system_prompt: &str, user_text: &str) -> Result<String>;
}
