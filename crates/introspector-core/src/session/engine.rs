use crate::constants::limits::MIN_MESSAGES_FOR_SUMMARY;
use crate::error::{IntrospectError, Result};
use crate::llm::{FragmentStream, ProviderAdapter};
use crate::prompt::{
    build_summary_prompt, build_system_prompt, format_summary_request, format_transcript, Style,
};
use crate::session::model::{is_aha, Session, SessionState};
use crate::summary::{merge_links, parse_summary, SummaryResult};
use crate::vault::{LinkExistenceChecker, NoteDraft};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// The opening haiku.
    Opening,
    /// A reply to a user message.
    Reply,
}

/// Fragments of one assistant turn, streamed as the provider produces them.
///
/// The turn holds the engine's session slot mutably, so no other turn can
/// start while it is alive. The reply is appended to history only when the
/// stream runs to completion; dropping the turn early, or a provider error,
/// commits nothing. An opening that does not complete discards the session.
pub struct Turn<'a> {
    slot: &'a mut Option<Session>,
    stream: FragmentStream,
    kind: TurnKind,
    text: String,
    finished: bool,
}

impl<'a> Turn<'a> {
    fn new(slot: &'a mut Option<Session>, stream: FragmentStream, kind: TurnKind) -> Self {
        if let Some(session) = slot.as_mut() {
            session.set_state(SessionState::Streaming);
        }
        Self {
            slot,
            stream,
            kind,
            text: String::new(),
            finished: false,
        }
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    /// Text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Drain the remaining fragments and return the full reply.
    pub async fn complete(mut self) -> Result<String> {
        while let Some(fragment) = self.next().await {
            fragment?;
        }
        Ok(std::mem::take(&mut self.text))
    }

    fn commit(&mut self) {
        let Some(session) = self.slot.as_mut() else {
            return;
        };
        let text = self.text.clone();
        match self.kind {
            TurnKind::Opening => session.commit_opening(text),
            TurnKind::Reply => session.commit_reply(text),
        }
        tracing::info!(
            session = %session.id(),
            kind = ?self.kind,
            messages = session.len(),
            resolution = session.resolution_signalled(),
            "turn committed"
        );
    }

    fn abort(&mut self, reason: &str) {
        match self.kind {
            TurnKind::Opening => {
                if let Some(session) = self.slot.take() {
                    tracing::warn!(session = %session.id(), reason, "opening failed, session discarded");
                }
            }
            TurnKind::Reply => {
                if let Some(session) = self.slot.as_mut() {
                    session.set_state(SessionState::Idle);
                    tracing::warn!(session = %session.id(), reason, "reply discarded");
                }
            }
        }
    }
}

impl Stream for Turn<'_> {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match futures::ready!(this.stream.poll_next_unpin(cx)) {
            Some(Ok(fragment)) => {
                this.text.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Some(Err(err)) => {
                this.finished = true;
                this.abort("provider error");
                Poll::Ready(Some(Err(err)))
            }
            None => {
                this.finished = true;
                if this.text.trim().is_empty() {
                    this.abort("empty reply");
                    return Poll::Ready(Some(Err(IntrospectError::UnexpectedResponseShape(
                        "stream completed without any text".into(),
                    ))));
                }
                this.commit();
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.abort("stream dropped before completion");
        }
    }
}

impl fmt::Debug for Turn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Turn")
            .field("session", &self.slot.as_ref().map(|s| s.id()))
            .field("kind", &self.kind)
            .field("received", &self.text.len())
            .field("finished", &self.finished)
            .finish()
    }
}

/// What `advance` did with the user's input.
#[derive(Debug)]
pub enum Advance<'a> {
    /// Blank input: nothing was appended or sent.
    Ignored,
    /// The user message was appended and a reply is streaming.
    Reply(Turn<'a>),
    /// The user message was appended and signalled an "aha"; call
    /// [`ConversationEngine::finalize`] next. No reply was requested.
    Finalize,
}

/// Drives one session at a time: opening, turns, and the final summary.
///
/// Callers serialize calls; the `&mut self` receivers and the borrowed
/// [`Turn`] make overlapping turns on one engine impossible.
pub struct ConversationEngine {
    provider: Arc<dyn ProviderAdapter>,
    session: Option<Session>,
}

impl ConversationEngine {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            provider,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Drop the current session, if any.
    pub fn discard(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(session = %session.id(), messages = session.len(), "session discarded");
        }
    }

    /// Start a new session and stream its opening haiku. Any previous
    /// session is discarded first.
    pub async fn begin(&mut self, style: Style, context: Option<String>) -> Result<Turn<'_>> {
        self.discard();

        let session = Session::new(style, context);
        let system_prompt = build_system_prompt(style, session.context());
        tracing::info!(
            session = %session.id(),
            style = style.id(),
            context = session.context().is_some(),
            "beginning session"
        );

        let stream = self.provider.stream_start(&system_prompt).await?;
        self.session = Some(session);
        Ok(Turn::new(&mut self.session, stream, TurnKind::Opening))
    }

    /// Send one user message.
    ///
    /// Blank input is ignored. Otherwise the message is appended before
    /// anything is sent, so it survives a failed reply.
    pub async fn advance(&mut self, user_text: &str) -> Result<Advance<'_>> {
        let session = self.session.as_mut().ok_or(IntrospectError::NoActiveSession)?;
        if session.state() == SessionState::Done {
            return Err(IntrospectError::SessionFinished);
        }
        if !session.is_opened() {
            return Err(IntrospectError::NoActiveSession);
        }

        let text = user_text.trim();
        if text.is_empty() {
            return Ok(Advance::Ignored);
        }

        session.push_user(text);

        if is_aha(text) {
            tracing::info!(session = %session.id(), "aha received, routing to finalize");
            return Ok(Advance::Finalize);
        }

        let system_prompt = build_system_prompt(session.style(), session.context());
        let stream = self
            .provider
            .stream_continue(&system_prompt, session.messages())
            .await
            .inspect_err(|e| {
                tracing::warn!(session = %session.id(), error = %e, "reply failed to start");
            })?;

        Ok(Advance::Reply(Turn::new(
            &mut self.session,
            stream,
            TurnKind::Reply,
        )))
    }

    /// Summarize the session.
    ///
    /// Needs at least one full exchange; fails with `InsufficientHistory`
    /// before any network call otherwise. Suggested links the checker
    /// confirms come first, followed by the rest in first-seen order.
    pub async fn finalize(&mut self, links: &dyn LinkExistenceChecker) -> Result<SummaryResult> {
        let session = self.session.as_mut().ok_or(IntrospectError::NoActiveSession)?;
        if session.state() == SessionState::Done {
            return Err(IntrospectError::SessionFinished);
        }
        if session.len() < MIN_MESSAGES_FOR_SUMMARY {
            return Err(IntrospectError::insufficient_history(
                MIN_MESSAGES_FOR_SUMMARY,
                session.len(),
            ));
        }

        session.set_state(SessionState::Finalizing);
        tracing::info!(session = %session.id(), messages = session.len(), "finalizing session");

        let request = format_summary_request(&format_transcript(session.messages()));
        let raw = match self
            .provider
            .complete_summary(build_summary_prompt(), &request)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                session.set_state(SessionState::Idle);
                tracing::warn!(session = %session.id(), error = %e, "summary failed");
                return Err(e);
            }
        };

        let mut summary = parse_summary(&raw);
        let mut confirmed = Vec::new();
        for link in &summary.links {
            if links.exists(link).await {
                confirmed.push(link.clone());
            }
        }
        summary.links = merge_links(&confirmed, &summary.links);

        session.set_state(SessionState::Done);
        tracing::info!(
            session = %session.id(),
            insights = summary.insights.len(),
            links = summary.links.len(),
            confirmed = confirmed.len(),
            "session finalized"
        );
        Ok(summary)
    }

    /// Package a summary with the session details a persister needs.
    pub fn note_draft(&self, summary: SummaryResult) -> Option<NoteDraft> {
        self.session.as_ref().map(|session| NoteDraft {
            summary,
            opening_text: session.opening_text().to_string(),
            started_at: session.started_at(),
            style: session.style(),
            transcript: session.messages().to_vec(),
        })
    }
}
