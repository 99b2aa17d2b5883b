//! Static routing tables
//!
//! Every preference list the router and the resilience controller consult
//! lives here as data, so it can be overridden from configuration.

use crate::backend::BackendId;
use crate::complexity::Complexity;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use BackendId::{Anthropic, DeepSeek, Gemini, Groq, OpenAi};

/// Preference and fallback tables
///
/// A field missing from configuration keeps its default; a map that is
/// present replaces the default map entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingTable {
    /// Tried in order for high-complexity prompts
    pub high_complexity: Vec<BackendId>,
    /// Tried in order for low-complexity prompts
    pub low_complexity: Vec<BackendId>,
    /// Registry default when the preferred default is not registered
    pub default_priority: Vec<BackendId>,
    /// Per-role preference, most preferred first
    pub role_preferences: BTreeMap<Role, Vec<BackendId>>,
    /// Alternates to try after a backend fails
    pub fallback_chains: BTreeMap<BackendId, Vec<BackendId>>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        let role_preferences = BTreeMap::from([
            (Role::Architect, vec![Anthropic, OpenAi, Gemini, DeepSeek, Groq]),
            (Role::Coder, vec![OpenAi, DeepSeek, Anthropic, Groq, Gemini]),
            (Role::Reviewer, vec![Anthropic, OpenAi, Gemini, DeepSeek, Groq]),
            (Role::Tester, vec![OpenAi, DeepSeek, Gemini, Anthropic, Groq]),
            (Role::Debugger, vec![Anthropic, DeepSeek, OpenAi, Gemini, Groq]),
            (Role::Optimizer, vec![OpenAi, Anthropic, DeepSeek, Gemini, Groq]),
            (Role::Security, vec![Anthropic, OpenAi, Gemini, DeepSeek, Groq]),
            (Role::Devops, vec![OpenAi, Gemini, Groq, DeepSeek, Anthropic]),
        ]);

        let fallback_chains = BTreeMap::from([
            (OpenAi, vec![Anthropic, Gemini, DeepSeek, Groq]),
            (Anthropic, vec![OpenAi, Gemini, DeepSeek, Groq]),
            (Gemini, vec![OpenAi, Anthropic, Groq, DeepSeek]),
            (DeepSeek, vec![OpenAi, Groq, Gemini, Anthropic]),
            (Groq, vec![DeepSeek, Gemini, OpenAi, Anthropic]),
        ]);

        Self {
            high_complexity: vec![Anthropic, OpenAi],
            low_complexity: vec![Groq, DeepSeek, Gemini],
            default_priority: vec![OpenAi, Anthropic, Gemini, DeepSeek, Groq],
            role_preferences,
            fallback_chains,
        }
    }
}

impl RoutingTable {
    /// Preference list for a role; empty when the table has none
    #[must_use]
    pub fn role_preferences(&self, role: Role) -> &[BackendId] {
        self.role_preferences
            .get(&role)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Fallback chain for a backend; empty when the table has none
    #[must_use]
    pub fn fallback_chain(&self, backend: BackendId) -> &[BackendId] {
        self.fallback_chains
            .get(&backend)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Complexity shortlist; `Medium` has none
    #[must_use]
    pub fn shortlist(&self, complexity: Complexity) -> &[BackendId] {
        match complexity {
            Complexity::High => &self.high_complexity,
            Complexity::Low => &self.low_complexity,
            Complexity::Medium => &[],
        }
    }
}
