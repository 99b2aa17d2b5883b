//! Backend capability clients
//!
//! One client per remote backend. OpenAI, DeepSeek and Groq speak the same
//! chat-completions dialect and share [`openai_compat`]; Anthropic and Gemini
//! have their own wire types.

/// Anthropic Messages API client
pub mod anthropic;
/// Client configuration
pub mod config;
/// Google Gemini client
pub mod gemini;
pub(crate) mod http;
/// OpenAI-compatible chat completions client
pub mod openai_compat;

pub use anthropic::AnthropicProvider;
pub use config::ProviderConfig;
pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;

use crate::backend::{Backend, BackendId, ModelInfo};
use crate::error::Result;
use crate::usage::lookup_price;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-backend overrides read from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Model override
    pub model: Option<String>,
    /// Base URL override (proxies, gateways)
    pub base_url: Option<String>,
    /// One-shot request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Instantiate the client for a backend
pub fn build(
    id: BackendId,
    api_key: &str,
    settings: &BackendSettings,
) -> Result<Arc<dyn Backend>> {
    let config = ProviderConfig::new(id, api_key).apply(settings);
    let backend: Arc<dyn Backend> = match id {
        BackendId::OpenAi | BackendId::DeepSeek | BackendId::Groq => {
            Arc::new(OpenAiCompatProvider::new(config)?)
        }
        BackendId::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        BackendId::Gemini => Arc::new(GeminiProvider::new(config)?),
    };
    Ok(backend)
}

/// Qualitative notes per backend, shown by `describe_model`
fn profile(id: BackendId) -> (&'static [&'static str], &'static [&'static str]) {
    match id {
        BackendId::OpenAi => (
            &["general coding", "tool use", "broad knowledge"],
            &["higher cost than budget backends"],
        ),
        BackendId::Anthropic => (
            &["long-form reasoning", "code review", "large context"],
            &["premium pricing", "stricter rate limits"],
        ),
        BackendId::Gemini => (
            &["very large context", "low cost", "multilingual"],
            &["less consistent code style"],
        ),
        BackendId::DeepSeek => (
            &["very low cost", "strong at code"],
            &["higher latency at peak hours", "smaller context window"],
        ),
        BackendId::Groq => (
            &["very low latency", "cheap open-weight models"],
            &["weaker on complex reasoning", "tight free-tier limits"],
        ),
    }
}

/// Model metadata assembled from the price table and backend profile
pub(crate) fn model_info(id: BackendId, model: &str) -> ModelInfo {
    let price = lookup_price(id, model, config::default_model(id));
    let (strengths, weaknesses) = profile(id);
    ModelInfo {
        backend: id,
        name: model.to_string(),
        context_window: price.context_window,
        input_price_per_million: price.input_per_million,
        output_price_per_million: price.output_per_million,
        strengths,
        weaknesses,
    }
}

/// Cost of a call, pricing unknown models as `default_model`
pub(crate) fn estimate_cost(
    id: BackendId,
    default_model: &str,
    input_tokens: u32,
    output_tokens: u32,
    model: &str,
) -> f64 {
    lookup_price(id, model, default_model).calculate_cost(input_tokens, output_tokens)
}
