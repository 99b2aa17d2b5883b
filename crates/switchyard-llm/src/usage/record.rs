//! Usage Records and Statistics

use crate::backend::BackendId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Approximate token count: `ceil(chars / 4)` over Unicode scalar values
#[must_use]
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count();
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}

/// Estimated usage for one successful call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    /// Backend that served the call
    pub backend: BackendId,
    /// Model name
    pub model: String,
    /// Estimated input tokens
    pub input_tokens: u32,
    /// Estimated output tokens
    pub output_tokens: u32,
    /// Estimated cost (USD)
    pub estimated_cost: f64,
    /// When the call completed
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    /// Total tokens
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Per-backend session totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendUsage {
    /// Request count
    pub requests: u64,
    /// Input tokens
    pub input_tokens: u64,
    /// Output tokens
    pub output_tokens: u64,
    /// Total cost (USD)
    pub total_cost: f64,
}

/// Aggregated session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageStats {
    /// Total requests
    pub total_requests: u64,
    /// Total input tokens
    pub total_input_tokens: u64,
    /// Total output tokens
    pub total_output_tokens: u64,
    /// Total estimated cost (USD)
    pub total_cost: f64,
    /// Usage by backend
    pub by_backend: BTreeMap<BackendId, BackendUsage>,
}
