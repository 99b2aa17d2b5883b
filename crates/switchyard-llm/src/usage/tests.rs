//! Tests for usage module

use super::*;
use crate::backend::BackendId;
use crate::message::Message;
use crate::testing::{MockBackend, MOCK_INPUT_PRICE, MOCK_OUTPUT_PRICE};

#[test]
fn test_estimate_tokens_rounds_up() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcde"), 2);
    assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
}

#[test]
fn test_estimate_tokens_counts_characters_not_bytes() {
    // 4 chars, 12 bytes
    assert_eq!(estimate_tokens("优化安全"), 1);
}

#[test]
fn test_model_price_calculation() {
    let price = lookup_price(BackendId::OpenAi, "gpt-4o", "gpt-4o");
    let cost = price.calculate_cost(1_000_000, 1_000_000);
    assert!((cost - 12.5).abs() < 0.001);
}

#[test]
fn test_price_tables_start_with_default_model() {
    for id in BackendId::ALL {
        let table = price_table(id);
        assert!(!table.is_empty(), "{id}");
        assert_eq!(
            table[0].model,
            crate::providers::config::default_model(id),
            "{id}"
        );
    }
}

#[test]
fn test_unknown_model_uses_fallback_price() {
    let fallback = lookup_price(BackendId::Anthropic, "claude-next", "claude-haiku-4-5-20251001");
    assert_eq!(fallback.model, "claude-haiku-4-5-20251001");

    // neither known: first entry
    let first = lookup_price(BackendId::Gemini, "gemini-9", "gemini-10");
    assert_eq!(first.model, "gemini-2.5-flash");
}

#[test]
fn test_measure_covers_every_message() {
    let backend = MockBackend::new(BackendId::Groq);
    let messages = [
        Message::system("abcd"),
        Message::user("efgh"),
        Message::user("ijklm"),
    ];
    let record = UsageTracker::measure(&backend, "groq-mock", &messages, "12345678");

    // 13 chars in, 8 chars out
    assert_eq!(record.input_tokens, 4);
    assert_eq!(record.output_tokens, 2);
    assert_eq!(record.total_tokens(), 6);
    assert_eq!(record.backend, BackendId::Groq);
    assert_eq!(record.model, "groq-mock");

    let expected = (4.0 * MOCK_INPUT_PRICE + 2.0 * MOCK_OUTPUT_PRICE) / 1_000_000.0;
    assert!((record.estimated_cost - expected).abs() < 1e-12);
}

#[tokio::test]
async fn test_tracker_aggregates_by_backend() {
    let tracker = UsageTracker::new();
    let groq = MockBackend::new(BackendId::Groq);
    let openai = MockBackend::new(BackendId::OpenAi);
    let messages = [Message::user("x".repeat(40))];

    let a = UsageTracker::measure(&groq, "m", &messages, &"y".repeat(8));
    let b = UsageTracker::measure(&openai, "m", &messages, &"y".repeat(8));
    tracker.record(&a).await;
    tracker.record(&a).await;
    tracker.record(&b).await;

    let stats = tracker.stats().await;
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.total_input_tokens, 30);
    assert_eq!(stats.total_output_tokens, 6);
    assert_eq!(stats.by_backend.len(), 2);
    assert_eq!(stats.by_backend[&BackendId::Groq].requests, 2);
    assert_eq!(stats.by_backend[&BackendId::OpenAi].input_tokens, 10);
    assert!((stats.total_cost - 3.0 * a.estimated_cost).abs() < 1e-12);
}

#[tokio::test]
async fn test_tracker_reset() {
    let tracker = UsageTracker::new();
    let backend = MockBackend::new(BackendId::Gemini);
    let record = UsageTracker::measure(&backend, "m", &[Message::user("hi")], "hello");
    tracker.record(&record).await;
    assert_eq!(tracker.stats().await.total_requests, 1);

    tracker.reset().await;
    assert_eq!(tracker.stats().await, UsageStats::default());
}
