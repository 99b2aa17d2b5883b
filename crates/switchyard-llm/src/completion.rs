//! Completion request and result types
//!
//! A [`CompletionRequest`] is what the IDE shell hands to the adapter; a
//! [`CompletionResult`] is what comes back from a successful one-shot call.

use crate::backend::{BackendChoice, BackendId};
use crate::message::Message;
use crate::role::Role;
use crate::usage::UsageRecord;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Max tokens sent when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Temperature sent when the caller does not set one
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Per-call generation options passed through to the backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Model override (backend-specific)
    pub model: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
}

impl ChatOptions {
    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Max tokens, falling back to [`DEFAULT_MAX_TOKENS`]
    #[must_use]
    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Temperature, falling back to [`DEFAULT_TEMPERATURE`]
    #[must_use]
    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// A routing request from the IDE shell
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Task role
    pub role: Role,
    /// Task text
    pub prompt: String,
    /// Supplementary context placed ahead of the task
    pub context: Option<String>,
    /// Explicit backend or `auto`
    pub backend: BackendChoice,
    /// Generation options
    pub options: ChatOptions,
    /// Prior conversation, inserted between the system message and the task
    pub history: Vec<Message>,
    /// Caller-side cancellation
    pub cancel: Option<CancellationToken>,
}

impl CompletionRequest {
    /// Create a request for a role and prompt, routed automatically
    #[must_use]
    pub fn new(role: Role, prompt: impl Into<String>) -> Self {
        Self {
            role,
            prompt: prompt.into(),
            context: None,
            backend: BackendChoice::Auto,
            options: ChatOptions::default(),
            history: Vec::new(),
            cancel: None,
        }
    }

    /// Attach context
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Pick the backend explicitly (or `auto`)
    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<BackendChoice>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Set generation options
    #[must_use]
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach prior conversation
    #[must_use]
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether the caller has already cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// The user message text: context (if any) ahead of the task
    #[must_use]
    pub fn user_content(&self) -> String {
        match self.context.as_deref().map(str::trim) {
            Some(context) if !context.is_empty() => {
                format!("Context:\n{context}\n\nTask:\n{}", self.prompt)
            }
            _ => self.prompt.clone(),
        }
    }
}

/// Successful one-shot completion
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    /// Correlates log lines for this request
    pub request_id: Uuid,
    /// Response text
    pub text: String,
    /// Backend that produced the text
    pub backend: BackendId,
    /// Model that produced the text
    pub model: String,
    /// Estimated usage
    pub usage: UsageRecord,
    /// Backends attempted, in order; the last one succeeded
    pub attempts: Vec<BackendId>,
}

impl CompletionResult {
    /// Whether the answer came from a fallback rather than the first choice
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.attempts.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_options_builder() {
        let options = ChatOptions::default()
            .with_model("gpt-4o-mini")
            .with_max_tokens(100)
            .with_temperature(0.2);

        assert_eq!(options.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(options.max_tokens_or_default(), 100);
        assert_eq!(options.temperature_or_default(), 0.2);
    }

    #[test]
    fn test_chat_options_defaults() {
        let options = ChatOptions::default();
        assert_eq!(options.max_tokens_or_default(), DEFAULT_MAX_TOKENS);
        assert_eq!(options.temperature_or_default(), DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_user_content_without_context() {
        let request = CompletionRequest::new(Role::Coder, "write a loop");
        assert_eq!(request.user_content(), "write a loop");

        let blank = CompletionRequest::new(Role::Coder, "write a loop").with_context("   ");
        assert_eq!(blank.user_content(), "write a loop");
    }

    #[test]
    fn test_user_content_puts_context_first() {
        let request =
            CompletionRequest::new(Role::Debugger, "why does this panic?").with_context("fn main() {}");
        let content = request.user_content();
        let context_at = content.find("fn main() {}").unwrap();
        let task_at = content.find("why does this panic?").unwrap();
        assert!(context_at < task_at);
    }

    #[test]
    fn test_cancellation_flag() {
        let token = CancellationToken::new();
        let request = CompletionRequest::new(Role::Coder, "x").with_cancellation(token.clone());
        assert!(!request.is_cancelled());
        token.cancel();
        assert!(request.is_cancelled());
    }
}
