//! Router implementation
//!
//! Picks exactly one registered backend per request. Order of precedence:
//! explicit override, complexity shortlist, role preference, registry default.

use super::table::RoutingTable;
use crate::backend::{BackendChoice, BackendId};
use crate::complexity::{Complexity, ComplexityEstimator, KeywordEstimator};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::role::{Role, RoleCatalogue};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Why the router picked a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    /// Caller named a registered backend
    Override,
    /// First registered entry of the high-complexity shortlist
    HighComplexity,
    /// First registered entry of the low-complexity shortlist
    LowComplexity,
    /// First registered entry of the role's preferences
    RolePreference,
    /// Nothing else matched
    Default,
}

impl fmt::Display for RouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Override => "override",
            Self::HighComplexity => "high_complexity",
            Self::LowComplexity => "low_complexity",
            Self::RolePreference => "role_preference",
            Self::Default => "default",
        };
        f.write_str(s)
    }
}

/// Outcome of a routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    /// Chosen backend, always registered
    pub backend: BackendId,
    /// Which rule chose it
    pub reason: RouteReason,
    /// Estimated complexity; `None` when an override skipped estimation
    pub complexity: Option<Complexity>,
}

/// Backend router
///
/// Registry, role catalogue and tables are read-only after construction;
/// only the default backend can change, behind a lock.
pub struct Router {
    registry: Arc<Registry>,
    table: RoutingTable,
    catalogue: RoleCatalogue,
    estimator: Arc<dyn ComplexityEstimator>,
    default_backend: RwLock<BackendId>,
}

impl Router {
    /// Create a router with the keyword complexity heuristic
    #[must_use]
    pub fn new(registry: Arc<Registry>, table: RoutingTable) -> Self {
        let catalogue = RoleCatalogue::new(&table);
        let default_backend = RwLock::new(registry.default_backend());
        Self {
            registry,
            table,
            catalogue,
            estimator: Arc::new(KeywordEstimator::default()),
            default_backend,
        }
    }

    /// Swap the complexity strategy
    #[must_use]
    pub fn with_estimator(mut self, estimator: Arc<dyn ComplexityEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Registered backends
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Routing tables
    #[must_use]
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Role prompts and preferences
    #[must_use]
    pub fn catalogue(&self) -> &RoleCatalogue {
        &self.catalogue
    }

    /// Current default backend
    #[must_use]
    pub fn default_backend(&self) -> BackendId {
        *self
            .default_backend
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Change the default backend
    pub fn set_default(&self, id: BackendId) -> Result<()> {
        if !self.registry.has(id) {
            return Err(Error::NotRegistered(id));
        }
        let mut current = self
            .default_backend
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *current, id);
        info!(from = %previous, to = %id, "Default backend changed");
        Ok(())
    }

    /// Estimate a prompt's complexity with the configured strategy
    #[must_use]
    pub fn complexity(&self, prompt: &str) -> Complexity {
        self.estimator.estimate(prompt)
    }

    fn first_registered(&self, candidates: &[BackendId]) -> Option<BackendId> {
        candidates.iter().copied().find(|id| self.registry.has(*id))
    }

    /// Decide which backend serves a request, and why
    #[must_use]
    pub fn decide(&self, choice: BackendChoice, role: Role, prompt: &str) -> RouteDecision {
        if let Some(requested) = choice.explicit() {
            if self.registry.has(requested) {
                return RouteDecision {
                    backend: requested,
                    reason: RouteReason::Override,
                    complexity: None,
                };
            }
            warn!(
                backend = %requested,
                "Requested backend is not registered, routing automatically"
            );
        }

        let complexity = self.complexity(prompt);
        let shortlist_reason = match complexity {
            Complexity::High => Some(RouteReason::HighComplexity),
            Complexity::Low => Some(RouteReason::LowComplexity),
            Complexity::Medium => None,
        };

        let decision = shortlist_reason
            .and_then(|reason| {
                self.first_registered(self.table.shortlist(complexity))
                    .map(|backend| (backend, reason))
            })
            .or_else(|| {
                self.first_registered(self.catalogue.preferences(role))
                    .map(|backend| (backend, RouteReason::RolePreference))
            })
            .unwrap_or_else(|| (self.default_backend(), RouteReason::Default));

        let (backend, reason) = decision;
        debug!(
            backend = %backend,
            reason = %reason,
            complexity = %complexity,
            role = %role,
            "Routed"
        );
        RouteDecision {
            backend,
            reason,
            complexity: Some(complexity),
        }
    }

    /// Pick the backend for a request
    #[must_use]
    pub fn route(&self, choice: BackendChoice, role: Role, prompt: &str) -> BackendId {
        self.decide(choice, role, prompt).backend
    }

    /// Alternates to try after `failed`
    #[must_use]
    pub fn fallback_chain(&self, failed: BackendId) -> &[BackendId] {
        self.table.fallback_chain(failed)
    }
}
