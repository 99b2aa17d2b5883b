//! Resilience controller
//!
//! Runs one one-shot request to completion: route, attempt, and on failure
//! walk the failed backend's fallback chain. Attempts are strictly
//! sequential and no backend is attempted twice within one request.

use crate::backend::{Backend, BackendId};
use crate::completion::{ChatOptions, CompletionRequest, CompletionResult};
use crate::error::{BackendError, Error, Result};
use crate::message::Message;
use crate::role::RoleCatalogue;
use crate::router::Router;
use crate::usage::UsageTracker;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Per-attempt deadline used when none is configured
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

enum AttemptError {
    Cancelled,
    Failed(BackendError),
}

/// Build the message sequence for a request: the role's system prompt, any
/// prior conversation, then the user message.
#[must_use]
pub fn build_messages(catalogue: &RoleCatalogue, request: &CompletionRequest) -> Vec<Message> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(Message::system(catalogue.system_prompt(request.role)));
    messages.extend(
        request
            .history
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .cloned(),
    );
    messages.push(Message::user(request.user_content()));
    messages
}

/// Drives routing, attempts and fallback for one-shot requests
///
/// Holds no per-request state; concurrent `execute` calls are independent.
pub struct ResilienceController {
    router: Arc<Router>,
    attempt_timeout: Duration,
}

impl ResilienceController {
    /// Create a controller over a shared router
    #[must_use]
    pub fn new(router: Arc<Router>, attempt_timeout: Duration) -> Self {
        let attempt_timeout = if attempt_timeout.is_zero() {
            DEFAULT_ATTEMPT_TIMEOUT
        } else {
            attempt_timeout
        };
        Self {
            router,
            attempt_timeout,
        }
    }

    /// Deadline applied to each attempt
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Run a request through routing and the fallback chain
    pub async fn execute(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        self.run(Uuid::new_v4(), request).await
    }

    #[instrument(
        skip(self, request),
        fields(request_id = %request_id, role = %request.role, choice = %request.backend)
    )]
    async fn run(&self, request_id: Uuid, request: &CompletionRequest) -> Result<CompletionResult> {
        if request.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let registry = self.router.registry();
        let origin = self
            .router
            .route(request.backend, request.role, &request.prompt);
        let messages = build_messages(self.router.catalogue(), request);
        // a model override names a model of the first choice only
        let fallback_options = ChatOptions {
            model: None,
            ..request.options.clone()
        };

        let mut queue = VecDeque::from([origin]);
        let mut attempted: Vec<BackendId> = Vec::new();
        let mut last_error: Option<BackendError> = None;

        while let Some(id) = queue.pop_front() {
            if request.is_cancelled() {
                info!(attempted = attempted.len(), "Request cancelled");
                return Err(Error::Cancelled);
            }

            let backend = registry.get(id)?;
            attempted.push(id);
            let options = if id == origin {
                &request.options
            } else {
                &fallback_options
            };
            let model = backend.resolve_model(options);
            debug!(backend = %id, model = %model, attempt = attempted.len(), "Attempting");

            match self
                .attempt(backend.as_ref(), &messages, options, request)
                .await
            {
                Ok(text) => {
                    let usage = UsageTracker::measure(backend.as_ref(), &model, &messages, &text);
                    info!(
                        backend = %id,
                        model = %model,
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        cost = usage.estimated_cost,
                        attempts = attempted.len(),
                        "Completion succeeded"
                    );
                    return Ok(CompletionResult {
                        request_id,
                        text,
                        backend: id,
                        model,
                        usage,
                        attempts: attempted,
                    });
                }
                Err(AttemptError::Cancelled) => {
                    info!(backend = %id, "Request cancelled during attempt");
                    return Err(Error::Cancelled);
                }
                Err(AttemptError::Failed(err)) => {
                    warn!(
                        backend = %id,
                        category = %err.category,
                        status = ?err.status,
                        "Attempt failed: {}",
                        err.message
                    );
                    for &alternate in self.router.fallback_chain(id) {
                        if attempted.contains(&alternate) || queue.contains(&alternate) {
                            continue;
                        }
                        if !registry.has(alternate) {
                            debug!(backend = %alternate, "Fallback not registered, skipping");
                            continue;
                        }
                        queue.push_back(alternate);
                    }
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(last) => {
                let registered = registry.ids();
                warn!(
                    origin = %origin,
                    attempted = ?attempted,
                    registered = ?registered,
                    category = %last.category,
                    "All providers exhausted"
                );
                Err(Error::AllProvidersExhausted {
                    origin,
                    attempted,
                    registered,
                    last,
                })
            }
            None => Err(Error::NotRegistered(origin)),
        }
    }

    async fn attempt(
        &self,
        backend: &dyn Backend,
        messages: &[Message],
        options: &ChatOptions,
        request: &CompletionRequest,
    ) -> std::result::Result<String, AttemptError> {
        let call = tokio::time::timeout(self.attempt_timeout, backend.send_chat(messages, options));
        let outcome = match &request.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(AttemptError::Cancelled),
                outcome = call => outcome,
            },
            None => call.await,
        };

        match outcome {
            Ok(Ok(text)) if text.trim().is_empty() => {
                Err(AttemptError::Failed(BackendError::empty_response(backend.id())))
            }
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(AttemptError::Failed(err)),
            Err(_elapsed) => Err(AttemptError::Failed(BackendError::timeout(
                backend.id(),
                self.attempt_timeout,
            ))),
        }
    }
}
