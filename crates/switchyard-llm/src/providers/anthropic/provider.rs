use super::convert::convert_messages;
use super::stream::fragments;
use super::types::{AnthropicRequest, AnthropicResponse, API_VERSION};
use crate::backend::{Backend, BackendId, FragmentStream, ModelInfo};
use crate::completion::ChatOptions;
use crate::error::{BackendError, Result};
use crate::message::Message;
use crate::providers::config::ProviderConfig;
use crate::providers::http;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = http::build_client(BackendId::Anthropic)?;
        debug!(config = ?config, "Anthropic provider created");
        Ok(Self { client, config })
    }

    fn request(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> RequestBuilder {
        let (system, messages) = convert_messages(messages);
        let body = AnthropicRequest {
            model: self.resolve_model(options),
            max_tokens: options.max_tokens_or_default(),
            system,
            messages,
            temperature: options.temperature_or_default(),
            stream,
        };

        self.client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
    }
}

#[async_trait::async_trait]
impl Backend for AnthropicProvider {
    fn id(&self) -> BackendId {
        BackendId::Anthropic
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, messages, options), fields(backend = "anthropic"))]
    async fn send_chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> std::result::Result<String, BackendError> {
        let request = self
            .request(messages, options, false)
            .timeout(self.config.timeout);
        let response: AnthropicResponse =
            http::send_json(BackendId::Anthropic, request, &self.config.api_key).await?;

        response
            .into_text()
            .ok_or_else(|| BackendError::empty_response(BackendId::Anthropic))
    }

    fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> FragmentStream {
        let request = self.request(messages, options, true);
        let events = http::sse_events(BackendId::Anthropic, request, self.config.api_key.clone());
        Box::pin(fragments(BackendId::Anthropic, events))
    }

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> f64 {
        crate::providers::estimate_cost(
            BackendId::Anthropic,
            &self.config.default_model,
            input_tokens,
            output_tokens,
            model,
        )
    }

    fn describe_model(&self) -> ModelInfo {
        crate::providers::model_info(BackendId::Anthropic, &self.config.default_model)
    }
}
