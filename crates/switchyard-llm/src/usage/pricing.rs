//! Model Pricing - static per-backend price tables
//!
//! The first entry of every table is that backend's default model, which is
//! also the price fallback for model ids the table does not know.

use crate::backend::BackendId;
use serde::Serialize;

/// Pricing information for a model (per 1M tokens, USD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPrice {
    /// Model name
    pub model: &'static str,
    /// Cost per 1M input tokens (USD)
    pub input_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_per_million: f64,
    /// Context window size
    pub context_window: u32,
}

impl ModelPrice {
    const fn new(
        model: &'static str,
        input_per_million: f64,
        output_per_million: f64,
        context_window: u32,
    ) -> Self {
        Self {
            model,
            input_per_million,
            output_per_million,
            context_window,
        }
    }

    /// Calculate cost for given token counts
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_per_million;
        input_cost + output_cost
    }
}

// ============================================================================
// Price tables
// ============================================================================

const OPENAI_PRICES: &[ModelPrice] = &[
    ModelPrice::new("gpt-4o", 2.50, 10.00, 128_000),
    ModelPrice::new("gpt-4o-mini", 0.15, 0.60, 128_000),
    ModelPrice::new("gpt-4.1", 2.00, 8.00, 1_047_576),
    ModelPrice::new("gpt-4.1-mini", 0.40, 1.60, 1_047_576),
    ModelPrice::new("gpt-5", 1.25, 10.00, 400_000),
    ModelPrice::new("gpt-5-nano", 0.05, 0.40, 400_000),
    ModelPrice::new("o3-mini", 1.10, 4.40, 200_000),
];

const ANTHROPIC_PRICES: &[ModelPrice] = &[
    ModelPrice::new("claude-sonnet-4-5-20250929", 3.00, 15.00, 200_000),
    ModelPrice::new("claude-haiku-4-5-20251001", 1.00, 5.00, 200_000),
    ModelPrice::new("claude-opus-4-5-20251101", 5.00, 25.00, 200_000),
    ModelPrice::new("claude-sonnet-4-20250514", 3.00, 15.00, 200_000),
    ModelPrice::new("claude-3-5-haiku-20241022", 0.80, 4.00, 200_000),
];

const GEMINI_PRICES: &[ModelPrice] = &[
    ModelPrice::new("gemini-2.5-flash", 0.30, 2.50, 1_048_576),
    ModelPrice::new("gemini-2.5-pro", 1.25, 10.00, 1_048_576),
    ModelPrice::new("gemini-2.5-flash-lite", 0.10, 0.40, 1_048_576),
    ModelPrice::new("gemini-2.0-flash", 0.10, 0.40, 1_048_576),
];

const DEEPSEEK_PRICES: &[ModelPrice] = &[
    ModelPrice::new("deepseek-chat", 0.27, 1.10, 64_000),
    ModelPrice::new("deepseek-reasoner", 0.55, 2.19, 64_000),
];

const GROQ_PRICES: &[ModelPrice] = &[
    ModelPrice::new("llama-3.3-70b-versatile", 0.59, 0.79, 131_072),
    ModelPrice::new("llama-3.1-8b-instant", 0.05, 0.08, 131_072),
    ModelPrice::new("openai/gpt-oss-20b", 0.10, 0.50, 131_072),
    ModelPrice::new("openai/gpt-oss-120b", 0.15, 0.75, 131_072),
];

/// Price table for a backend; the first entry is its default model
#[must_use]
pub fn price_table(backend: BackendId) -> &'static [ModelPrice] {
    match backend {
        BackendId::OpenAi => OPENAI_PRICES,
        BackendId::Anthropic => ANTHROPIC_PRICES,
        BackendId::Gemini => GEMINI_PRICES,
        BackendId::DeepSeek => DEEPSEEK_PRICES,
        BackendId::Groq => GROQ_PRICES,
    }
}

/// Price for `model` on `backend`, falling back to `fallback_model` and then
/// to the first table entry when neither is known
#[must_use]
pub fn lookup_price(backend: BackendId, model: &str, fallback_model: &str) -> ModelPrice {
    let table = price_table(backend);
    table
        .iter()
        .find(|p| p.model == model)
        .or_else(|| table.iter().find(|p| p.model == fallback_model))
        .or_else(|| table.first())
        .copied()
        .unwrap_or(ModelPrice::new("unknown", 0.0, 0.0, 0))
}
