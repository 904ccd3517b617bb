use crate::config::SettingsSource;
use crate::constants::{endpoints, env, limits, models, session};
use crate::error::{IntrospectError, Result};
use crate::llm::traits::*;
use crate::llm::{ClaudeClient, OpenRouterClient};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which backend a call goes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Anthropic's API, addressed directly.
    #[default]
    Direct,
    /// OpenRouter, addressing many providers through one key.
    Routed,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "Anthropic (direct)",
            Self::Routed => "OpenRouter",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Direct => endpoints::CLAUDE_BASE_URL,
            Self::Routed => endpoints::OPENROUTER_BASE_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Direct => models::DEFAULT_DIRECT_MODEL,
            Self::Routed => models::DEFAULT_ROUTED_MODEL,
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Direct => env::DIRECT_API_KEY,
            Self::Routed => env::ROUTED_API_KEY,
        }
    }

    pub fn all() -> [Backend; 2] {
        [Self::Direct, Self::Routed]
    }
}

impl FromStr for Backend {
    type Err = IntrospectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "anthropic" | "claude" => Ok(Self::Direct),
            "routed" | "openrouter" => Ok(Self::Routed),
            other => Err(IntrospectError::Config(format!(
                "Unknown backend `{other}` (expected direct or routed)"
            ))),
        }
    }
}

/// Resolved, per-call provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    pub backend: Backend,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ProviderConfig")
            .field("backend", &self.backend)
            .field("api_key", &api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(backend: Backend, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            model: backend.default_model().to_string(),
            base_url: backend.default_base_url().to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Build the client for this backend. Fails before any network I/O when
    /// no credential is present.
    pub fn build_client(&self, http: &reqwest::Client) -> Result<Box<dyn LlmClient>> {
        if !self.is_configured() {
            return Err(IntrospectError::ProviderUnconfigured(format!(
                "set an API key for {} (or the {} environment variable)",
                self.backend.name(),
                self.backend.default_api_key_env()
            )));
        }

        match self.backend {
            Backend::Direct => Ok(Box::new(
                ClaudeClient::new(&self.api_key)
                    .with_model(&self.model)
                    .with_base_url(&self.base_url)
                    .with_http_client(http.clone()),
            )),
            Backend::Routed => Ok(Box::new(
                OpenRouterClient::new(&self.api_key)
                    .with_model(&self.model)
                    .with_base_url(&self.base_url)
                    .with_http_client(http.clone()),
            )),
        }
    }
}

/// The production [`ProviderAdapter`]: resolves the backend from its settings
/// source on every call, so configuration edits apply on the next turn.
///
/// Holds no per-session state and can be shared between sessions.
pub struct ConfiguredProvider {
    source: Arc<dyn SettingsSource>,
    http: reqwest::Client,
}

impl ConfiguredProvider {
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        Self {
            source,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// The configuration the next call will use.
    pub fn current_config(&self) -> ProviderConfig {
        self.source.provider_config()
    }

    pub fn is_configured(&self) -> bool {
        self.current_config().is_configured()
    }

    fn client(&self) -> Result<Box<dyn LlmClient>> {
        let config = self.current_config();
        tracing::debug!(backend = ?config.backend, model = %config.model, "resolved provider");
        config.build_client(&self.http)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for ConfiguredProvider {
    async fn stream_start(&self, system_prompt: &str) -> Result<FragmentStream> {
        let client = self.client()?;
        let request = ChatRequest::new(
            system_prompt,
            vec![Message::user(session::OPENING_USER_TURN)],
            limits::MAX_CONVERSATION_TOKENS,
        );
        client.chat_stream(&request).await
    }

    async fn stream_continue(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<FragmentStream> {
        let client = self.client()?;
        let request = ChatRequest::new(
            system_prompt,
            history.to_vec(),
            limits::MAX_CONVERSATION_TOKENS,
        );
        client.chat_stream(&request).await
    }

    async fn complete_summary(&self, system_prompt: &str, user_text: &str) -> Result<String> {
        let client = self.client()?;
        let request = ChatRequest::new(
            system_prompt,
            vec![Message::user(user_text)],
            limits::MAX_SUMMARY_TOKENS,
        );
        client.chat(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parses_aliases() {
        assert_eq!("direct".parse::<Backend>().unwrap(), Backend::Direct);
        assert_eq!("Anthropic".parse::<Backend>().unwrap(), Backend::Direct);
        assert_eq!("openrouter".parse::<Backend>().unwrap(), Backend::Routed);
        assert!("ollama".parse::<Backend>().is_err());
    }

    #[test]
    fn test_debug_output_redacts_key() {
        let config = ProviderConfig::new(Backend::Direct, "sk-ant-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-ant-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_missing_key_is_unconfigured() {
        let config = ProviderConfig::new(Backend::Routed, "  ");
        let err = config.build_client(&reqwest::Client::new()).err().unwrap();
        assert!(matches!(err, IntrospectError::ProviderUnconfigured(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_every_operation() {
        let settings = crate::config::Settings::default();
        let provider = ConfiguredProvider::new(Arc::new(settings));
        // Default settings carry no inline key; only run if the env is clean too.
        if provider.is_configured() {
            return;
        }

        assert!(matches!(
            provider.stream_start("sys").await.err(),
            Some(IntrospectError::ProviderUnconfigured(_))
        ));
        assert!(matches!(
            provider.stream_continue("sys", &[]).await.err(),
            Some(IntrospectError::ProviderUnconfigured(_))
        ));
        assert!(matches!(
            provider.complete_summary("sys", "text").await,
            Err(IntrospectError::ProviderUnconfigured(_))
        ));
    }
}
