use crate::constants::{endpoints, models};
use crate::error::{IntrospectError, Result};
use crate::llm::sse::spawn_sse_reader;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Routed backend: OpenRouter's OpenAI-compatible chat completions endpoint,
/// which fronts many providers behind one key.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: models::DEFAULT_ROUTED_MODEL.to_string(),
            base_url: endpoints::OPENROUTER_BASE_URL.to_string(),
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

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request(&self, request: &ChatRequest, stream: bool) -> OpenRouterRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": request.system,
            }));
        }
        messages.extend(request.messages.iter().map(|m| {
            serde_json::json!({
                "role": m.role,
                "content": m.content,
            })
        }));

        OpenRouterRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            stream: stream.then_some(true),
        }
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.build_request(request, stream);

        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            stream,
            "dispatching routed completion"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", endpoints::OPENROUTER_REFERER)
            .header("X-Title", endpoints::OPENROUTER_TITLE)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "routed backend returned an error");
            return Err(IntrospectError::ProviderResponse(format!(
                "OpenRouter API error ({status}): {text}"
            )));
        }

        Ok(response)
    }
}

#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<Value>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    #[serde(default)]
    choices: Vec<OpenRouterChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: Option<String>,
}

fn extract_text(body: &str) -> Result<String> {
    let response: OpenRouterResponse = serde_json::from_str(body)
        .map_err(|e| IntrospectError::ProviderResponse(format!("Failed to parse response: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| IntrospectError::ProviderResponse("No response from OpenRouter".into()))
}

/// Translate one SSE `data:` payload from the chat completions stream.
fn parse_stream_chunk(data: &str) -> Option<StreamEvent> {
    if data == "[DONE]" {
        return Some(StreamEvent::Done);
    }

    let chunk: Value = serde_json::from_str(data).ok()?;

    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Some(StreamEvent::Error(message));
    }

    chunk
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
        .map(|c| StreamEvent::TextDelta(c.to_string()))
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self.send(request, false).await?;
        let body = response.text().await?;
        extract_text(&body)
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let response = self.send(request, true).await?;
        Ok(spawn_sse_reader(response.bytes_stream(), "routed", parse_stream_chunk))
    }
}
