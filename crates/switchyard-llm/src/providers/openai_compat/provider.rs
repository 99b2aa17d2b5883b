use super::types::{ChatMessage, ChatRequest, ChatResponse, StreamChunk};
use crate::backend::{Backend, BackendId, FragmentStream, ModelInfo};
use crate::completion::ChatOptions;
use crate::error::{BackendError, Result};
use crate::message::Message;
use crate::providers::config::ProviderConfig;
use crate::providers::http;
use crate::sse::SseEvent;
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument, warn};

/// Client for OpenAI-style `/chat/completions` endpoints
pub struct OpenAiCompatProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiCompatProvider {
    /// Create a new provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = http::build_client(config.backend)?;
        debug!(backend = %config.backend, config = ?config, "Provider created");
        Ok(Self { client, config })
    }

    fn request(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> RequestBuilder {
        let model = self.resolve_model(options);
        let body = ChatRequest {
            model: &model,
            messages: messages.iter().map(ChatMessage::from).collect(),
            max_tokens: options.max_tokens_or_default(),
            temperature: options.temperature_or_default(),
            stream,
        };

        self.client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
    }
}

/// Map chat-completion stream events to text fragments
pub(crate) fn fragments<S>(
    backend: BackendId,
    events: S,
) -> impl Stream<Item = std::result::Result<String, BackendError>> + Send + 'static
where
    S: Stream<Item = std::result::Result<SseEvent, BackendError>> + Send + 'static,
{
    try_stream! {
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            let event = event?;
            if event.is_done() {
                break;
            }
            if event.data.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StreamChunk>(&event.data) {
                Ok(chunk) => {
                    if let Some(error) = chunk.error.as_ref() {
                        let status = error.status();
                        Err::<(), _>(BackendError::new(backend, status, error.message.clone()))?;
                    }
                    let text = chunk.text();
                    if !text.is_empty() {
                        yield text;
                    }
                }
                Err(e) => warn!(backend = %backend, "Skipping malformed stream chunk: {e}"),
            }
        }
    }
}

#[async_trait::async_trait]
impl Backend for OpenAiCompatProvider {
    fn id(&self) -> BackendId {
        self.config.backend
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, messages, options), fields(backend = %self.config.backend))]
    async fn send_chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> std::result::Result<String, BackendError> {
        let request = self
            .request(messages, options, false)
            .timeout(self.config.timeout);
        let response: ChatResponse =
            http::send_json(self.config.backend, request, &self.config.api_key).await?;

        response
            .into_text()
            .ok_or_else(|| BackendError::empty_response(self.config.backend))
    }

    fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> FragmentStream {
        let backend = self.config.backend;
        let request = self.request(messages, options, true);
        let events = http::sse_events(backend, request, self.config.api_key.clone());
        Box::pin(fragments(backend, events))
    }

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> f64 {
        crate::providers::estimate_cost(
            self.config.backend,
            &self.config.default_model,
            input_tokens,
            output_tokens,
            model,
        )
    }

    fn describe_model(&self) -> ModelInfo {
        crate::providers::model_info(self.config.backend, &self.config.default_model)
    }
}
