//! Scripted backend for tests
//!
//! [`MockBackend`] never touches the network. One-shot calls pop queued
//! outcomes and fall back to a default outcome when the queue is empty.

use crate::backend::{Backend, BackendId, FragmentStream, ModelInfo};
use crate::completion::ChatOptions;
use crate::error::BackendError;
use crate::message::Message;
use async_stream::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock price per 1M input tokens (USD)
pub const MOCK_INPUT_PRICE: f64 = 1.0;

/// Mock price per 1M output tokens (USD)
pub const MOCK_OUTPUT_PRICE: f64 = 2.0;

/// What a mock call does
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Succeed with this text (or yield it as a fragment when streaming)
    Reply(String),
    /// Fail with this status and message
    Fail {
        /// HTTP status, if any
        status: Option<u16>,
        /// Provider message
        message: String,
    },
    /// Never complete
    Hang,
}

impl MockOutcome {
    /// Successful reply
    #[must_use]
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }

    /// HTTP failure
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Fail {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Failure without a status code
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Fail {
            status: None,
            message: message.into(),
        }
    }
}

/// A backend that replays scripted outcomes
pub struct MockBackend {
    id: BackendId,
    model: String,
    queue: Mutex<VecDeque<MockOutcome>>,
    default_outcome: MockOutcome,
    stream_script: Vec<MockOutcome>,
    calls: AtomicUsize,
    stream_calls: AtomicUsize,
    last_messages: Mutex<Vec<Message>>,
}

impl MockBackend {
    /// Mock that answers "mock response" to everything
    #[must_use]
    pub fn new(id: BackendId) -> Self {
        Self {
            id,
            model: format!("{id}-mock"),
            queue: Mutex::new(VecDeque::new()),
            default_outcome: MockOutcome::reply("mock response"),
            stream_script: vec![MockOutcome::reply("mock "), MockOutcome::reply("response")],
            calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    /// Mock that always fails with `status` and `message`
    #[must_use]
    pub fn failing(id: BackendId, status: u16, message: impl Into<String>) -> Self {
        Self::new(id).with_default(MockOutcome::http(status, message))
    }

    /// Set the model name
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Outcome used once the queue is empty
    #[must_use]
    pub fn with_default(mut self, outcome: MockOutcome) -> Self {
        self.default_outcome = outcome;
        self
    }

    /// Script for `stream_chat`: replies are fragments, a failure ends the
    /// stream, `Hang` stalls it
    #[must_use]
    pub fn with_stream(mut self, script: Vec<MockOutcome>) -> Self {
        self.stream_script = script;
        self
    }

    /// Queue an outcome for the next one-shot call
    pub fn push(&self, outcome: MockOutcome) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    /// Number of `send_chat` calls so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `stream_chat` calls so far
    #[must_use]
    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    /// Messages of the most recent call
    #[must_use]
    pub fn last_messages(&self) -> Vec<Message> {
        self.last_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn remember(&self, messages: &[Message]) {
        *self.last_messages.lock().unwrap_or_else(|e| e.into_inner()) = messages.to_vec();
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    fn id(&self) -> BackendId {
        self.id
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn send_chat(
        &self,
        messages: &[Message],
        _options: &ChatOptions,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.remember(messages);

        let next = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next.unwrap_or_else(|| self.default_outcome.clone()) {
            MockOutcome::Reply(text) if text.trim().is_empty() => {
                Err(BackendError::empty_response(self.id))
            }
            MockOutcome::Reply(text) => Ok(text),
            MockOutcome::Fail { status, message } => {
                Err(BackendError::new(self.id, status, message))
            }
            MockOutcome::Hang => std::future::pending().await,
        }
    }

    fn stream_chat(&self, messages: &[Message], _options: &ChatOptions) -> FragmentStream {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.remember(messages);

        let id = self.id;
        let script = self.stream_script.clone();
        Box::pin(stream! {
            for step in script {
                match step {
                    MockOutcome::Reply(text) => yield Ok(text),
                    MockOutcome::Fail { status, message } => {
                        yield Err(BackendError::new(id, status, message));
                        break;
                    }
                    MockOutcome::Hang => std::future::pending::<()>().await,
                }
            }
        })
    }

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, _model: &str) -> f64 {
        (input_tokens as f64 / 1_000_000.0) * MOCK_INPUT_PRICE
            + (output_tokens as f64 / 1_000_000.0) * MOCK_OUTPUT_PRICE
    }

    fn describe_model(&self) -> ModelInfo {
        ModelInfo {
            backend: self.id,
            name: self.model.clone(),
            context_window: 8_192,
            input_price_per_million: MOCK_INPUT_PRICE,
            output_price_per_million: MOCK_OUTPUT_PRICE,
            strengths: &["deterministic"],
            weaknesses: &["not a real model"],
        }
    }
}
