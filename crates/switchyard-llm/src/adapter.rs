//! Unified adapter
//!
//! The façade the IDE shell talks to: one-shot completions with fallback,
//! single-attempt streams, backend listing, default selection, credential
//! diagnostics and session usage.

use crate::backend::{Backend, BackendChoice, BackendId};
use crate::completion::{CompletionRequest, CompletionResult};
use crate::config::AdapterConfig;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::resilience::{build_messages, ResilienceController};
use crate::role::Role;
use crate::router::{RouteDecision, Router};
use crate::streaming::{self, TextStream};
use crate::usage::{UsageStats, UsageTracker};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Availability of one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    /// Backend
    pub id: BackendId,
    /// Whether a client is registered
    pub registered: bool,
    /// Whether this is the current default
    pub is_default: bool,
    /// Configured model, when registered
    pub model: Option<String>,
}

/// Provider routing and resilience façade
pub struct UnifiedAdapter {
    router: Arc<Router>,
    controller: ResilienceController,
    usage: UsageTracker,
}

impl UnifiedAdapter {
    /// Register every backend with a well-formed credential.
    ///
    /// Fails with [`Error::NoProviderConfigured`] when none qualifies.
    pub fn new(config: &AdapterConfig, credentials: &Credentials) -> Result<Self> {
        let registry = Registry::from_credentials(
            credentials,
            &config.backends,
            config.default_backend,
            &config.routing.default_priority,
        )?;
        Ok(Self::with_registry(registry, config))
    }

    /// Build around an existing registry
    #[must_use]
    pub fn with_registry(registry: Registry, config: &AdapterConfig) -> Self {
        let router = Router::new(Arc::new(registry), config.routing.clone());
        Self::from_router(router, config.attempt_timeout())
    }

    /// Build from ready-made backend clients
    pub fn from_backends(
        backends: impl IntoIterator<Item = Arc<dyn Backend>>,
        config: &AdapterConfig,
    ) -> Result<Self> {
        let registry = Registry::from_backends(
            backends,
            config.default_backend,
            &config.routing.default_priority,
        )?;
        Ok(Self::with_registry(registry, config))
    }

    /// Build around a configured router
    #[must_use]
    pub fn from_router(router: Router, attempt_timeout: Duration) -> Self {
        let router = Arc::new(router);
        let controller = ResilienceController::new(Arc::clone(&router), attempt_timeout);
        info!(
            backends = ?router.registry().ids(),
            default = %router.default_backend(),
            "Unified adapter ready"
        );
        Self {
            router,
            controller,
            usage: UsageTracker::new(),
        }
    }

    /// Routed, resilient one-shot completion
    #[instrument(skip(self, request), fields(role = %request.role, choice = %request.backend))]
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        let result = self.controller.execute(request).await?;
        self.usage.record(&result.usage).await;
        Ok(result)
    }

    /// Routed single-attempt stream.
    ///
    /// Failures after the stream opens arrive as its final item.
    #[instrument(skip(self, request), fields(role = %request.role, choice = %request.backend))]
    pub fn stream(&self, request: &CompletionRequest) -> Result<TextStream> {
        if request.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let decision = self.router.decide(request.backend, request.role, &request.prompt);
        let backend = self.router.registry().get(decision.backend)?;
        let messages = build_messages(self.router.catalogue(), request);
        info!(
            backend = %decision.backend,
            reason = %decision.reason,
            model = %backend.resolve_model(&request.options),
            "Opening stream"
        );
        Ok(streaming::open(
            backend.as_ref(),
            &messages,
            &request.options,
            request.cancel.clone(),
        ))
    }

    /// Every known backend with its availability
    #[must_use]
    pub fn backends(&self) -> Vec<BackendStatus> {
        let registry = self.router.registry();
        let default = self.router.default_backend();
        BackendId::ALL
            .into_iter()
            .map(|id| {
                let model = registry.get(id).ok().map(|b| b.default_model().to_string());
                BackendStatus {
                    id,
                    registered: model.is_some(),
                    is_default: id == default,
                    model,
                }
            })
            .collect()
    }

    /// Change the default backend
    pub fn set_default(&self, id: BackendId) -> Result<()> {
        self.router.set_default(id)
    }

    /// Current default backend
    #[must_use]
    pub fn default_backend(&self) -> BackendId {
        self.router.default_backend()
    }

    /// Issue a minimal real call to check a backend's credential
    #[instrument(skip(self))]
    pub async fn validate(&self, id: BackendId) -> Result<bool> {
        let backend = self.router.registry().get(id)?;
        Ok(backend.validate_credential().await)
    }

    /// Routing decision for a request, without calling any backend
    #[must_use]
    pub fn route(&self, choice: BackendChoice, role: Role, prompt: &str) -> RouteDecision {
        self.router.decide(choice, role, prompt)
    }

    /// Session usage totals
    pub async fn usage(&self) -> UsageStats {
        self.usage.stats().await
    }

    /// Usage tracker, for resetting totals
    #[must_use]
    pub fn usage_tracker(&self) -> &UsageTracker {
        &self.usage
    }

    /// Underlying router
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }
}
