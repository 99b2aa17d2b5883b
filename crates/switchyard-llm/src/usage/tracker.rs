//! Usage Tracker - in-memory session totals

use super::record::{estimate_tokens, BackendUsage, UsageRecord, UsageStats};
use crate::backend::Backend;
use crate::message::Message;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

/// Session-scoped usage aggregator
///
/// Totals live only as long as the tracker; nothing is written to disk.
#[derive(Debug, Default)]
pub struct UsageTracker {
    stats: RwLock<UsageStats>,
}

impl UsageTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the usage record for a successful call.
    ///
    /// Input tokens cover every message sent; output tokens cover the reply.
    #[must_use]
    pub fn measure(
        backend: &dyn Backend,
        model: &str,
        messages: &[Message],
        response: &str,
    ) -> UsageRecord {
        let input_text: String = messages.iter().map(|m| m.content.as_str()).collect();
        let input_tokens = estimate_tokens(&input_text);
        let output_tokens = estimate_tokens(response);

        UsageRecord {
            backend: backend.id(),
            model: model.to_string(),
            input_tokens,
            output_tokens,
            estimated_cost: backend.estimate_cost(input_tokens, output_tokens, model),
            timestamp: Utc::now(),
        }
    }

    /// Add a record to the session totals
    pub async fn record(&self, record: &UsageRecord) {
        let mut stats = self.stats.write().await;
        stats.total_requests += 1;
        stats.total_input_tokens += u64::from(record.input_tokens);
        stats.total_output_tokens += u64::from(record.output_tokens);
        stats.total_cost += record.estimated_cost;

        let entry: &mut BackendUsage = stats.by_backend.entry(record.backend).or_default();
        entry.requests += 1;
        entry.input_tokens += u64::from(record.input_tokens);
        entry.output_tokens += u64::from(record.output_tokens);
        entry.total_cost += record.estimated_cost;

        debug!(
            backend = %record.backend,
            total_requests = stats.total_requests,
            "Usage recorded"
        );
    }

    /// Snapshot of the session totals
    pub async fn stats(&self) -> UsageStats {
        self.stats.read().await.clone()
    }

    /// Clear the session totals
    pub async fn reset(&self) {
        *self.stats.write().await = UsageStats::default();
    }
}
