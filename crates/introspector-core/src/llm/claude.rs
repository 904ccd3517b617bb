use crate::constants::{endpoints, models};
use crate::error::{IntrospectError, Result};
use crate::llm::sse::spawn_sse_reader;
use crate::llm::traits::*;
use serde::Deserialize;
use serde_json::Value;

/// Direct backend: the Anthropic Messages API.
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_DIRECT_MODEL.to_string(),
            base_url: endpoints::CLAUDE_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Share a connection pool with other clients.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request_body(&self, request: &ChatRequest, stream: bool) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": messages,
        });

        if !request.system.is_empty() {
            body["system"] = Value::String(request.system.clone());
        }

        if stream {
            body["stream"] = Value::Bool(true);
        }

        body
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let body = self.build_request_body(request, stream);

        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            stream,
            "dispatching direct completion"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", endpoints::ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "direct backend returned an error");
            return Err(IntrospectError::ProviderResponse(format!(
                "Claude API error ({status}): {text}"
            )));
        }

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Pull the single text payload out of a non-streamed response body.
fn extract_text(body: &str) -> Result<String> {
    let response: ClaudeApiResponse = serde_json::from_str(body)
        .map_err(|e| IntrospectError::ProviderResponse(format!("Failed to parse response: {e}")))?;

    let first = response.content.first().ok_or_else(|| {
        IntrospectError::UnexpectedResponseShape("response contained no content blocks".into())
    })?;

    if first.content_type != "text" {
        return Err(IntrospectError::UnexpectedResponseShape(format!(
            "expected a text block, got `{}`",
            first.content_type
        )));
    }

    Ok(first.text.clone())
}

/// Translate one SSE `data:` payload from the Messages API.
fn parse_stream_event(data: &str) -> Option<StreamEvent> {
    let event: Value = serde_json::from_str(data).ok()?;
    match event.get("type").and_then(|t| t.as_str()) {
        Some("content_block_delta") => {
            let delta = event.get("delta")?;
            if delta.get("type").and_then(|t| t.as_str()) != Some("text_delta") {
                return None;
            }
            delta
                .get("text")
                .and_then(|t| t.as_str())
                .map(|t| StreamEvent::TextDelta(t.to_string()))
        }
        Some("message_stop") => Some(StreamEvent::Done),
        Some("error") => {
            let message = event
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("unknown stream error");
            Some(StreamEvent::Error(message.to_string()))
        }
        _ => None,
    }
}

#[async_trait::async_trait]
impl LlmClient for ClaudeClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self.send(request, false).await?;
        let body = response.text().await?;
        extract_text(&body)
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let response = self.send(request, true).await?;
        Ok(spawn_sse_reader(response.bytes_stream(), "direct", parse_stream_event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::new(
            "be brief",
            vec![Message::user("hi"), Message::assistant("hello?")],
            500,
        )
    }

    #[test]
    fn test_request_body_carries_system_and_history() {
        let client = ClaudeClient::new("key").with_model("m");
        let body = client.build_request_body(&request(), false);

        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"], "hello?");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_stream_flag_only_when_streaming() {
        let client = ClaudeClient::new("key");
        let body = client.build_request_body(&request(), true);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_extracts_first_text_block() {
        let body = r#"{"content":[{"type":"text","text":"Still water?"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Still water?");
    }

    #[test]
    fn test_non_text_block_is_unexpected_shape() {
        let body = r#"{"content":[{"type":"tool_use","id":"x"}]}"#;
        assert!(matches!(
            extract_text(body),
            Err(IntrospectError::UnexpectedResponseShape(_))
        ));
    }

    #[test]
    fn test_empty_content_is_unexpected_shape() {
        assert!(matches!(
            extract_text(r#"{"content":[]}"#),
            Err(IntrospectError::UnexpectedResponseShape(_))
        ));
    }

    #[test]
    fn test_malformed_body_is_provider_error() {
        assert!(matches!(
            extract_text("<html>bad gateway</html>"),
            Err(IntrospectError::ProviderResponse(_))
        ));
    }

    #[test]
    fn test_parses_stream_events() {
        assert_eq!(
            parse_stream_event(
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#
            ),
            Some(StreamEvent::TextDelta("Hi".into()))
        );
        assert_eq!(
            parse_stream_event(r#"{"type":"message_stop"}"#),
            Some(StreamEvent::Done)
        );
        assert_eq!(
            parse_stream_event(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#),
            Some(StreamEvent::Error("Overloaded".into()))
        );
        assert_eq!(parse_stream_event(r#"{"type":"ping"}"#), None);
        assert_eq!(parse_stream_event("not json"), None);
    }
}
