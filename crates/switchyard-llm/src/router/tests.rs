//! Tests for router module

use super::*;
use crate::backend::{Backend, BackendChoice, BackendId};
use crate::complexity::{Complexity, ComplexityEstimator};
use crate::error::Error;
use crate::registry::Registry;
use crate::role::Role;
use crate::testing::MockBackend;
use std::sync::Arc;

fn router_with(ids: &[BackendId]) -> Router {
    let backends: Vec<Arc<dyn Backend>> = ids
        .iter()
        .map(|id| Arc::new(MockBackend::new(*id)) as Arc<dyn Backend>)
        .collect();
    let table = RoutingTable::default();
    let registry = Registry::from_backends(backends, None, &table.default_priority).unwrap();
    Router::new(Arc::new(registry), table)
}

struct Fixed(Complexity);

impl ComplexityEstimator for Fixed {
    fn estimate(&self, _prompt: &str) -> Complexity {
        self.0
    }
}

#[test]
fn test_medium_prompt_follows_role_preference() {
    // coder: openai, deepseek, anthropic, groq, gemini
    let router = router_with(&[BackendId::Anthropic, BackendId::DeepSeek]);
    let decision = router.decide(BackendChoice::Auto, Role::Coder, "write a loop");

    assert_eq!(decision.backend, BackendId::DeepSeek);
    assert_eq!(decision.reason, RouteReason::RolePreference);
    assert_eq!(decision.complexity, Some(Complexity::Medium));
}

#[test]
fn test_override_wins_over_heuristics() {
    let router = router_with(&[BackendId::Anthropic, BackendId::Groq]);
    let prompt = "review the security architecture of this service";

    let decision = router.decide(BackendId::Groq.into(), Role::Architect, prompt);
    assert_eq!(decision.backend, BackendId::Groq);
    assert_eq!(decision.reason, RouteReason::Override);
    assert_eq!(decision.complexity, None);
}

#[test]
fn test_unregistered_override_routes_automatically() {
    let router = router_with(&[BackendId::Gemini]);
    let backend = router.route(BackendId::OpenAi.into(), Role::Coder, "write a loop");
    assert_eq!(backend, BackendId::Gemini);
}

#[test]
fn test_high_complexity_shortlist() {
    let router = router_with(&[BackendId::OpenAi, BackendId::Anthropic, BackendId::Groq]);
    let decision = router.decide(BackendChoice::Auto, Role::Devops, "optimize this query");
    assert_eq!(decision.backend, BackendId::Anthropic);
    assert_eq!(decision.reason, RouteReason::HighComplexity);

    // only the second shortlist entry registered
    let router = router_with(&[BackendId::OpenAi, BackendId::Groq]);
    assert_eq!(
        router.route(BackendChoice::Auto, Role::Devops, "optimize this query"),
        BackendId::OpenAi
    );
}

#[test]
fn test_low_complexity_shortlist() {
    let router = router_with(&[BackendId::OpenAi, BackendId::Gemini, BackendId::DeepSeek]);
    let decision = router.decide(BackendChoice::Auto, Role::Architect, "a quick question");
    assert_eq!(decision.backend, BackendId::DeepSeek);
    assert_eq!(decision.reason, RouteReason::LowComplexity);
}

#[test]
fn test_empty_shortlist_falls_to_role() {
    // high prompt, neither anthropic nor openai registered
    let router = router_with(&[BackendId::Groq, BackendId::Gemini]);
    let decision = router.decide(BackendChoice::Auto, Role::Security, "security audit");
    assert_eq!(decision.complexity, Some(Complexity::High));
    assert_eq!(decision.reason, RouteReason::RolePreference);
    // security: anthropic, openai, gemini, deepseek, groq
    assert_eq!(decision.backend, BackendId::Gemini);
}

#[test]
fn test_role_without_preferences_uses_default() {
    let mut table = RoutingTable::default();
    table.role_preferences.clear();
    let backends: Vec<Arc<dyn Backend>> = vec![
        Arc::new(MockBackend::new(BackendId::Groq)),
        Arc::new(MockBackend::new(BackendId::DeepSeek)),
    ];
    let registry =
        Registry::from_backends(backends, Some(BackendId::Groq), &table.default_priority).unwrap();
    let router = Router::new(Arc::new(registry), table);

    let decision = router.decide(BackendChoice::Auto, Role::Tester, "write a loop");
    assert_eq!(decision.backend, BackendId::Groq);
    assert_eq!(decision.reason, RouteReason::Default);
}

#[test]
fn test_auto_always_returns_registered_backend() {
    let long = "long ".repeat(200);
    let prompts = [
        "write a loop",
        "simple rename",
        "design pattern for plugins",
        long.as_str(),
    ];
    for id in BackendId::ALL {
        let router = router_with(&[id]);
        for role in Role::ALL {
            for prompt in prompts {
                assert_eq!(router.route(BackendChoice::Auto, role, prompt), id);
            }
        }
    }
}

#[test]
fn test_custom_estimator() {
    let router = router_with(&[BackendId::OpenAi, BackendId::Groq])
        .with_estimator(Arc::new(Fixed(Complexity::Low)));
    let decision = router.decide(BackendChoice::Auto, Role::Architect, "review the architecture");
    assert_eq!(decision.backend, BackendId::Groq);
    assert_eq!(decision.reason, RouteReason::LowComplexity);
}

#[test]
fn test_set_default() {
    let router = router_with(&[BackendId::OpenAi, BackendId::Groq]);
    assert_eq!(router.default_backend(), BackendId::OpenAi);

    router.set_default(BackendId::Groq).unwrap();
    assert_eq!(router.default_backend(), BackendId::Groq);

    let err = router.set_default(BackendId::Gemini).unwrap_err();
    assert!(matches!(err, Error::NotRegistered(BackendId::Gemini)));
    assert_eq!(router.default_backend(), BackendId::Groq);
}

#[test]
fn test_default_tables() {
    let table = RoutingTable::default();
    assert_eq!(
        table.shortlist(Complexity::High),
        &[BackendId::Anthropic, BackendId::OpenAi]
    );
    assert!(table.shortlist(Complexity::Medium).is_empty());
    for role in Role::ALL {
        assert_eq!(table.role_preferences(role).len(), 5, "{role}");
    }
    for id in BackendId::ALL {
        let chain = table.fallback_chain(id);
        assert_eq!(chain.len(), 4);
        assert!(!chain.contains(&id));
    }
}

#[test]
fn test_table_deserializes_partial_config() {
    let table: RoutingTable = from_json(
        r#"{"low_complexity": ["gemini"], "fallback_chains": {"groq": ["openai"]}}"#,
    );
    assert_eq!(table.low_complexity, vec![BackendId::Gemini]);
    assert_eq!(table.high_complexity, RoutingTable::default().high_complexity);
    assert_eq!(table.fallback_chain(BackendId::Groq), &[BackendId::OpenAi]);
    assert!(table.fallback_chain(BackendId::OpenAi).is_empty());
}

fn from_json(json: &str) -> RoutingTable {
    serde_json::from_str(json).unwrap()
}
