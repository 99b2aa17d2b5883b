//! Backend capability contract
//!
//! Every remote text-generation service is wrapped behind [`Backend`], so the
//! router and the resilience controller only ever see a uniform handle.

use crate::completion::ChatOptions;
use crate::error::{BackendError, Error};
use crate::message::Message;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use tracing::{debug, warn};

// ============================================================================
// Backend identity
// ============================================================================

/// Identifies a remote backend
///
/// Declaration order is the enum's `Ord`, which is also the listing order.
/// Deserializes through [`FromStr`], so aliases work in configuration and as
/// map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum BackendId {
    /// OpenAI chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// Google Gemini
    Gemini,
    /// DeepSeek (OpenAI-compatible)
    #[serde(rename = "deepseek")]
    DeepSeek,
    /// Groq (OpenAI-compatible)
    Groq,
}

impl BackendId {
    /// Every known backend
    pub const ALL: [BackendId; 5] = [
        BackendId::OpenAi,
        BackendId::Anthropic,
        BackendId::Gemini,
        BackendId::DeepSeek,
        BackendId::Groq,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::DeepSeek => "deepseek",
            Self::Groq => "groq",
        }
    }

    /// Environment variables holding this backend's credential, first match wins
    #[must_use]
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::Anthropic => &["ANTHROPIC_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::DeepSeek => &["DEEPSEEK_API_KEY"],
            Self::Groq => &["GROQ_API_KEY"],
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            "deepseek" => Ok(Self::DeepSeek),
            "groq" => Ok(Self::Groq),
            other => Err(Error::Config(format!("unknown backend '{other}'"))),
        }
    }
}

impl TryFrom<String> for BackendId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Caller's backend selection: a concrete backend or `auto`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendChoice {
    /// Let the router decide
    #[default]
    Auto,
    /// Use this backend when registered
    Backend(BackendId),
}

impl BackendChoice {
    /// The explicit backend, if any
    #[must_use]
    pub fn explicit(&self) -> Option<BackendId> {
        match self {
            Self::Auto => None,
            Self::Backend(id) => Some(*id),
        }
    }
}

impl From<BackendId> for BackendChoice {
    fn from(id: BackendId) -> Self {
        Self::Backend(id)
    }
}

impl FromStr for BackendChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Backend)
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Backend(id) => id.fmt(f),
        }
    }
}

// ============================================================================
// Model metadata
// ============================================================================

/// Static metadata about a backend's configured model
///
/// Informational only; routing never reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Backend serving the model
    pub backend: BackendId,
    /// Model identifier
    pub name: String,
    /// Context window in tokens
    pub context_window: u32,
    /// USD per 1M input tokens
    pub input_price_per_million: f64,
    /// USD per 1M output tokens
    pub output_price_per_million: f64,
    /// What the model is good at
    pub strengths: &'static [&'static str],
    /// Known weak spots
    pub weaknesses: &'static [&'static str],
}

// ============================================================================
// Capability trait
// ============================================================================

/// Lazily produced text fragments from one backend
///
/// Finite and not restartable. A failure ends the sequence with an `Err` item.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, BackendError>> + Send>>;

/// Prompt used by [`Backend::validate_credential`]
pub const VALIDATION_PROMPT: &str = "hello";

/// Uniform capability implemented once per remote backend
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Which backend this is
    fn id(&self) -> BackendId;

    /// Model used when the caller does not name one
    fn default_model(&self) -> &str;

    /// Complete a conversation and return the full answer.
    ///
    /// Never returns an empty string; absence of content is a failure.
    async fn send_chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<String, BackendError>;

    /// Stream a conversation's answer fragment by fragment
    fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> FragmentStream;

    /// Approximate USD cost; unknown models are priced as the default model
    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> f64;

    /// Static metadata for the configured model
    fn describe_model(&self) -> ModelInfo;

    /// Model an attempt with these options will use
    fn resolve_model(&self, options: &ChatOptions) -> String {
        options
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model().to_string())
    }

    /// Issue a minimal real call to check the credential.
    ///
    /// Consumes quota; meant for one-off diagnostics.
    async fn validate_credential(&self) -> bool {
        let messages = [Message::user(VALIDATION_PROMPT)];
        let options = ChatOptions::default().with_max_tokens(16);
        match self.send_chat(&messages, &options).await {
            Ok(_) => {
                debug!(backend = %self.id(), "Credential validated");
                true
            }
            Err(e) => {
                warn!(backend = %self.id(), category = %e.category, "Credential validation failed: {}", e.message);
                false
            }
        }
    }
}
