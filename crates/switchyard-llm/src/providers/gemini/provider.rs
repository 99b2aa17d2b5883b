use super::types::{convert_messages, GeminiRequest, GeminiResponse, GenerationConfig};
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

/// Google Gemini provider (API key auth)
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = http::build_client(BackendId::Gemini)?;
        debug!(config = ?config, "Gemini provider created");
        Ok(Self { client, config })
    }

    fn request(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> RequestBuilder {
        let (system_instruction, contents) = convert_messages(messages);
        let body = GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: options.temperature_or_default(),
                max_output_tokens: options.max_tokens_or_default(),
            },
        };

        let model = self.resolve_model(options);
        let url = if stream {
            format!(
                "{}/models/{model}:streamGenerateContent?alt=sse",
                self.config.base_url
            )
        } else {
            format!("{}/models/{model}:generateContent", self.config.base_url)
        };

        self.client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
    }
}

/// Map streamed `GenerateContentResponse` chunks to text fragments
pub(crate) fn fragments<S>(
    events: S,
) -> impl Stream<Item = std::result::Result<String, BackendError>> + Send + 'static
where
    S: Stream<Item = std::result::Result<SseEvent, BackendError>> + Send + 'static,
{
    try_stream! {
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            let event = event?;
            if event.data.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GeminiResponse>(&event.data) {
                Ok(chunk) => {
                    if let Some(error) = chunk.error.as_ref() {
                        let message = error.message.clone();
                        Err::<(), _>(BackendError::new(BackendId::Gemini, error.code, message))?;
                    }
                    let text = chunk.text();
                    if !text.is_empty() {
                        yield text;
                    }
                }
                Err(e) => warn!(backend = "gemini", "Skipping malformed stream chunk: {e}"),
            }
        }
    }
}

#[async_trait::async_trait]
impl Backend for GeminiProvider {
    fn id(&self) -> BackendId {
        BackendId::Gemini
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, messages, options), fields(backend = "gemini"))]
    async fn send_chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> std::result::Result<String, BackendError> {
        let request = self
            .request(messages, options, false)
            .timeout(self.config.timeout);
        let response: GeminiResponse =
            http::send_json(BackendId::Gemini, request, &self.config.api_key).await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(BackendError::empty_response(BackendId::Gemini));
        }
        Ok(text)
    }

    fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> FragmentStream {
        let request = self.request(messages, options, true);
        let events = http::sse_events(BackendId::Gemini, request, self.config.api_key.clone());
        Box::pin(fragments(events))
    }

    fn estimate_cost(&self, input_tokens: u32, output_tokens: u32, model: &str) -> f64 {
        crate::providers::estimate_cost(
            BackendId::Gemini,
            &self.config.default_model,
            input_tokens,
            output_tokens,
            model,
        )
    }

    fn describe_model(&self) -> ModelInfo {
        crate::providers::model_info(BackendId::Gemini, &self.config.default_model)
    }
}
