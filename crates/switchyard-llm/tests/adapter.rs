//! Integration tests for the unified adapter
//!
//! These drive the public API end to end with scripted backends:
//! - routing properties over every role and backend
//! - fallback, exhaustion and cancellation through `complete`
//! - streaming without fallback

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use switchyard_llm::testing::{MockBackend, MockOutcome};
use switchyard_llm::{
    AdapterConfig, Backend, BackendChoice, BackendId, CancellationToken, CompletionRequest,
    Complexity, Error, ErrorCategory, Role, RouteReason, RoutingTable, UnifiedAdapter,
};
use tokio_test::{assert_err, assert_ok};

fn adapter_with(mocks: &[Arc<MockBackend>], config: &AdapterConfig) -> UnifiedAdapter {
    let backends = mocks.iter().map(|m| Arc::clone(m) as Arc<dyn Backend>);
    assert_ok!(UnifiedAdapter::from_backends(backends, config))
}

fn config_with_chains(chains: &[(BackendId, Vec<BackendId>)]) -> AdapterConfig {
    AdapterConfig {
        routing: RoutingTable {
            fallback_chains: chains.iter().cloned().collect(),
            ..RoutingTable::default()
        },
        ..AdapterConfig::default()
    }
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_route_always_returns_a_registered_backend() {
    let subsets: [&[BackendId]; 4] = [
        &[BackendId::Groq],
        &[BackendId::Gemini, BackendId::DeepSeek],
        &[BackendId::OpenAi, BackendId::Anthropic, BackendId::Groq],
        &BackendId::ALL,
    ];
    let long_prompt = "step ".repeat(150);
    let prompts = [
        "write a loop",
        "a quick fix",
        "security review",
        long_prompt.as_str(),
    ];

    for subset in subsets {
        let mocks: Vec<Arc<MockBackend>> =
            subset.iter().map(|id| Arc::new(MockBackend::new(*id))).collect();
        let adapter = adapter_with(&mocks, &AdapterConfig::default());
        for role in Role::ALL {
            for prompt in prompts {
                let decision = adapter.route(BackendChoice::Auto, role, prompt);
                assert!(subset.contains(&decision.backend), "{role} {prompt}");
            }
        }
    }
}

#[test]
fn test_override_beats_high_complexity() {
    let mocks = [
        Arc::new(MockBackend::new(BackendId::Anthropic)),
        Arc::new(MockBackend::new(BackendId::Groq)),
    ];
    let adapter = adapter_with(&mocks, &AdapterConfig::default());

    let decision = adapter.route(
        BackendId::Groq.into(),
        Role::Security,
        "review the security architecture and optimize it",
    );
    assert_eq!(decision.backend, BackendId::Groq);
    assert_eq!(decision.reason, RouteReason::Override);
}

#[test]
fn test_long_prompt_is_high_complexity() {
    let mocks = [
        Arc::new(MockBackend::new(BackendId::OpenAi)),
        Arc::new(MockBackend::new(BackendId::Groq)),
    ];
    let adapter = adapter_with(&mocks, &AdapterConfig::default());

    let decision = adapter.route(BackendChoice::Auto, Role::Coder, &"a".repeat(501));
    assert_eq!(decision.complexity, Some(Complexity::High));
    assert_eq!(decision.backend, BackendId::OpenAi);
}

#[test]
fn test_default_backend_follows_set_default() {
    // no role preferences, so medium prompts land on the default
    let mut config = AdapterConfig::default();
    config.routing.role_preferences.clear();
    let mocks = [
        Arc::new(MockBackend::new(BackendId::OpenAi)),
        Arc::new(MockBackend::new(BackendId::DeepSeek)),
    ];
    let adapter = adapter_with(&mocks, &config);

    assert_eq!(
        adapter.route(BackendChoice::Auto, Role::Tester, "write a loop").backend,
        BackendId::OpenAi
    );
    assert_ok!(adapter.set_default(BackendId::DeepSeek));
    assert_eq!(
        adapter.route(BackendChoice::Auto, Role::Tester, "write a loop").backend,
        BackendId::DeepSeek
    );
    assert_err!(adapter.set_default(BackendId::Gemini));
}

// ============================================================================
// One-shot completions
// ============================================================================

#[tokio::test]
async fn test_rate_limit_falls_back_and_reports_the_fallback() {
    let a = Arc::new(MockBackend::failing(BackendId::Anthropic, 429, "rate_limit_error"));
    let b = Arc::new(MockBackend::new(BackendId::OpenAi));
    b.push(MockOutcome::reply("fallback answer"));
    let config = config_with_chains(&[(BackendId::Anthropic, vec![BackendId::OpenAi])]);
    let adapter = adapter_with(&[a.clone(), b.clone()], &config);

    let request = CompletionRequest::new(Role::Architect, "design the module layout")
        .with_backend(BackendId::Anthropic);
    let result = assert_ok!(adapter.complete(&request).await);

    assert_eq!(result.backend, BackendId::OpenAi);
    assert_eq!(result.text, "fallback answer");
    assert_eq!(result.attempts, vec![BackendId::Anthropic, BackendId::OpenAi]);

    let stats = adapter.usage().await;
    assert_eq!(stats.total_requests, 1);
    assert!(stats.by_backend.contains_key(&BackendId::OpenAi));
    assert!(!stats.by_backend.contains_key(&BackendId::Anthropic));
}

#[tokio::test]
async fn test_single_backend_exhaustion_names_backend_and_category() {
    let a = Arc::new(MockBackend::failing(BackendId::Gemini, 403, "permission denied"));
    let config = config_with_chains(&[(BackendId::Gemini, vec![BackendId::OpenAi])]);
    let adapter = adapter_with(&[a], &config);

    let err = assert_err!(
        adapter
            .complete(&CompletionRequest::new(Role::Coder, "write a loop"))
            .await
    );
    assert_eq!(err.category(), Some(ErrorCategory::AccessForbidden));
    let shown = err.to_string();
    assert!(shown.contains("first choice gemini"), "{shown}");
    assert!(shown.contains("access_forbidden"), "{shown}");
    assert!(shown.contains("registered backends: gemini"), "{shown}");
}

#[tokio::test]
async fn test_every_backend_failing_lists_all_registered() {
    let mocks: Vec<Arc<MockBackend>> = BackendId::ALL
        .iter()
        .map(|id| Arc::new(MockBackend::failing(*id, 500, "internal server error")))
        .collect();
    let adapter = adapter_with(&mocks, &AdapterConfig::default());

    let err = assert_err!(
        adapter
            .complete(&CompletionRequest::new(Role::Reviewer, "check this diff"))
            .await
    );
    match err {
        Error::AllProvidersExhausted {
            attempted,
            registered,
            ..
        } => {
            assert_eq!(registered, BackendId::ALL.to_vec());
            assert_eq!(attempted.len(), BackendId::ALL.len());
        }
        other => panic!("unexpected error: {other}"),
    }
    for mock in &mocks {
        assert_eq!(mock.calls(), 1);
    }
}

#[tokio::test]
async fn test_cancellation_is_not_retried() {
    let a = Arc::new(MockBackend::new(BackendId::OpenAi).with_default(MockOutcome::Hang));
    let b = Arc::new(MockBackend::new(BackendId::Anthropic));
    let config = config_with_chains(&[(BackendId::OpenAi, vec![BackendId::Anthropic])]);
    let adapter = adapter_with(&[a, b.clone()], &config);

    let token = CancellationToken::new();
    let request = CompletionRequest::new(Role::Coder, "write a loop")
        .with_backend(BackendId::OpenAi)
        .with_cancellation(token.clone());

    let (outcome, ()) = tokio::join!(adapter.complete(&request), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });
    assert!(matches!(outcome, Err(Error::Cancelled)));
    assert_eq!(b.calls(), 0);
}

// ============================================================================
// Streaming
// ============================================================================

#[tokio::test]
async fn test_stream_yields_fragments() {
    let a = Arc::new(MockBackend::new(BackendId::Groq).with_stream(vec![
        MockOutcome::reply("fn "),
        MockOutcome::reply("main"),
    ]));
    let adapter = adapter_with(&[a.clone()], &AdapterConfig::default());

    let stream = assert_ok!(adapter.stream(&CompletionRequest::new(Role::Coder, "write main")));
    let text: Vec<String> = stream.map(|item| item.unwrap_or_default()).collect().await;
    assert_eq!(text.concat(), "fn main");
    assert_eq!(a.stream_calls(), 1);
    assert_eq!(a.calls(), 0);
    assert_eq!(adapter.usage().await.total_requests, 0);
}

#[tokio::test]
async fn test_stream_failure_does_not_fall_back() {
    let a = Arc::new(
        MockBackend::new(BackendId::OpenAi)
            .with_stream(vec![MockOutcome::http(429, "Rate limit reached")]),
    );
    let b = Arc::new(MockBackend::new(BackendId::Anthropic));
    let config = config_with_chains(&[(BackendId::OpenAi, vec![BackendId::Anthropic])]);
    let adapter = adapter_with(&[a, b.clone()], &config);

    let request = CompletionRequest::new(Role::Coder, "x").with_backend(BackendId::OpenAi);
    let items: Vec<_> = assert_ok!(adapter.stream(&request)).collect().await;

    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_ref().err().and_then(Error::category),
        Some(ErrorCategory::RateLimitOrQuota)
    );
    assert_eq!(b.stream_calls(), 0);
    assert_eq!(b.calls(), 0);
}

#[test]
fn test_stream_with_cancelled_token_fails_fast() {
    let a = Arc::new(MockBackend::new(BackendId::Gemini));
    let adapter = adapter_with(&[a.clone()], &AdapterConfig::default());
    let token = CancellationToken::new();
    token.cancel();

    let request = CompletionRequest::new(Role::Coder, "x").with_cancellation(token);
    assert!(matches!(adapter.stream(&request), Err(Error::Cancelled)));
    assert_eq!(a.stream_calls(), 0);
}

#[test]
fn test_complete_on_a_plain_runtime() {
    let a = Arc::new(MockBackend::new(BackendId::DeepSeek));
    let adapter = adapter_with(&[a], &AdapterConfig::default());

    let result = tokio_test::block_on(adapter.complete(&CompletionRequest::new(
        Role::Debugger,
        "why does this panic?",
    )));
    let result = assert_ok!(result);
    assert_eq!(result.backend, BackendId::DeepSeek);
    assert!(result.usage.estimated_cost > 0.0);
}
