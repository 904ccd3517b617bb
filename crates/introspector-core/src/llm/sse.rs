//! Server-sent-event plumbing shared by both backends.

use crate::llm::traits::{FragmentStream, StreamEvent};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use std::fmt;

const TRUNCATED: &str = "stream ended before completion";

/// Accumulates raw body bytes and hands back complete `data:` payloads.
///
/// Bytes are split on `\n` before UTF-8 decoding, so a multi-byte character
/// spanning two network chunks is decoded intact.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buf: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete, trimmed line, if one is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    /// Next `data:` payload, skipping blank lines, comments and `event:` lines.
    pub fn next_data(&mut self) -> Option<String> {
        while let Some(line) = self.next_line() {
            if let Some(data) = line.strip_prefix("data:") {
                return Some(data.trim_start().to_string());
            }
        }
        None
    }
}

/// Read an SSE body on a background task, translating each `data:` payload
/// with `parse`, and expose the result as a [`FragmentStream`].
///
/// The body must end with a terminal event (`Done` or `Error`); a body that
/// closes before one arrives is reported as an error so a cut-off reply is
/// never mistaken for a complete one.
///
/// Dropping the returned stream closes the channel; the reader stops on its
/// next send and drops the body, which aborts the transfer.
pub(crate) fn spawn_sse_reader<S, B, E>(
    body: S,
    backend: &'static str,
    parse: fn(&str) -> Option<StreamEvent>,
) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: fmt::Display + Send,
{
    let (tx, rx) = mpsc::unbounded();
    let mut body = Box::pin(body);

    tokio::spawn(async move {
        let mut buffer = SseLineBuffer::new();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(backend, error = %e, "stream transport failed");
                    let _ = tx.unbounded_send(StreamEvent::Error(e.to_string()));
                    return;
                }
            };

            buffer.push(chunk.as_ref());

            while let Some(data) = buffer.next_data() {
                let Some(event) = parse(&data) else {
                    continue;
                };
                let terminal = !matches!(event, StreamEvent::TextDelta(_));
                if tx.unbounded_send(event).is_err() {
                    tracing::debug!(backend, "fragment receiver dropped, abandoning stream");
                    return;
                }
                if terminal {
                    return;
                }
            }
        }

        tracing::warn!(backend, "stream closed without a terminal event");
        let _ = tx.unbounded_send(StreamEvent::Error(TRUNCATED.to_string()));
    });

    FragmentStream::from_events(rx)
}
