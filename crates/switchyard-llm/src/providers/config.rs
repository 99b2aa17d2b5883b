//! Per-backend client configuration

use super::BackendSettings;
use crate::backend::BackendId;
use crate::util::mask_api_key;
use std::fmt;
use std::time::Duration;

/// Default request timeout for one-shot calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection phase timeout; also bounds stream setup
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default API base URL for a backend
#[must_use]
pub fn default_base_url(id: BackendId) -> &'static str {
    match id {
        BackendId::OpenAi => "https://api.openai.com/v1",
        BackendId::Anthropic => "https://api.anthropic.com",
        BackendId::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        BackendId::DeepSeek => "https://api.deepseek.com/v1",
        BackendId::Groq => "https://api.groq.com/openai/v1",
    }
}

/// Default model for a backend
#[must_use]
pub fn default_model(id: BackendId) -> &'static str {
    match id {
        BackendId::OpenAi => "gpt-4o",
        BackendId::Anthropic => "claude-sonnet-4-5-20250929",
        BackendId::Gemini => "gemini-2.5-flash",
        BackendId::DeepSeek => "deepseek-chat",
        BackendId::Groq => "llama-3.3-70b-versatile",
    }
}

/// Backend client configuration
#[derive(Clone)]
pub struct ProviderConfig {
    /// Which backend this configures
    pub backend: BackendId,
    /// API key
    pub api_key: String,
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Default model
    pub default_model: String,
    /// One-shot request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("backend", &self.backend)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration with the backend's defaults
    #[must_use]
    pub fn new(backend: BackendId, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            base_url: default_base_url(backend).to_string(),
            default_model: default_model(backend).to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply configured overrides; unset or blank fields keep their defaults
    #[must_use]
    pub fn apply(mut self, settings: &BackendSettings) -> Self {
        if let Some(model) = settings.model.as_deref().filter(|m| !m.trim().is_empty()) {
            self = self.with_model(model.trim());
        }
        if let Some(url) = settings.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            self = self.with_base_url(url.trim());
        }
        if let Some(ms) = settings.timeout_ms.filter(|ms| *ms > 0) {
            self = self.with_timeout(Duration::from_millis(ms));
        }
        self
    }
}
