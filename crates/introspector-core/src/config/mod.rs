use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::constants::paths;
use crate::error::{IntrospectError, Result};
use crate::llm::provider::{Backend, ProviderConfig};
use crate::prompt::Style;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_style: Style,
    pub provider: ProviderSettings,
    pub vault: VaultSettings,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub backend: Backend,
    /// Inline key. Takes precedence over any environment variable.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Environment variable to read the key from; empty means the
    /// backend's conventional variable.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key_env: String,
    pub direct_model: String,
    pub routed_model: String,
    pub direct_base_url: Option<String>,
    pub routed_base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Direct,
            api_key: String::new(),
            api_key_env: String::new(),
            direct_model: Backend::Direct.default_model().to_string(),
            routed_model: Backend::Routed.default_model().to_string(),
            direct_base_url: None,
            routed_base_url: None,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ProviderSettings")
            .field("backend", &self.backend)
            .field("api_key", &api_key)
            .field("api_key_env", &self.api_key_env)
            .field("direct_model", &self.direct_model)
            .field("routed_model", &self.routed_model)
            .field("direct_base_url", &self.direct_base_url)
            .field("routed_base_url", &self.routed_base_url)
            .finish()
    }
}

impl ProviderSettings {
    /// Resolve the key: inline value, then the configured env var, then the
    /// backend's conventional env var.
    pub fn api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        let var = if self.api_key_env.is_empty() {
            self.backend.default_api_key_env()
        } else {
            self.api_key_env.as_str()
        };
        std::env::var(var).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        match self.backend {
            Backend::Direct => self.direct_model.as_str(),
            Backend::Routed => self.routed_model.as_str(),
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        match self.backend {
            Backend::Direct => self.direct_model = model.into(),
            Backend::Routed => self.routed_model = model.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        let custom = match self.backend {
            Backend::Direct => self.direct_base_url.as_deref(),
            Backend::Routed => self.routed_base_url.as_deref(),
        };
        custom.unwrap_or_else(|| self.backend.default_base_url())
    }

    pub fn resolve(&self) -> ProviderConfig {
        ProviderConfig {
            backend: self.backend,
            api_key: self.api_key().unwrap_or_default(),
            model: self.model().to_string(),
            base_url: self.base_url().to_string(),
        }
    }
}

/// Where the markdown notes live and which parts of them feed the context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    pub root: PathBuf,
    pub save_folder: String,
    pub context_folders: Vec<String>,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            save_folder: paths::DEFAULT_SAVE_FOLDER.to_string(),
            context_folders: Vec::new(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load from the default location, falling back to defaults on any problem.
    pub fn load() -> Self {
        match Self::load_from(&Self::config_path()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable settings, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| IntrospectError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| IntrospectError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Read-only view of provider configuration, consulted on every provider call.
pub trait SettingsSource: Send + Sync {
    fn provider_config(&self) -> ProviderConfig;
}

impl SettingsSource for Settings {
    fn provider_config(&self) -> ProviderConfig {
        self.provider.resolve()
    }
}

/// Settings shared between an editor (CLI commands, a settings screen) and
/// the provider, so edits apply on the next call.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}

impl SettingsSource for SharedSettings {
    fn provider_config(&self) -> ProviderConfig {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .provider
            .resolve()
    }
}
