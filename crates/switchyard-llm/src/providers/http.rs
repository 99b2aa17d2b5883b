//! Shared HTTP plumbing for backend clients

use super::config::CONNECT_TIMEOUT;
use crate::backend::BackendId;
use crate::error::{BackendError, Error, Result};
use crate::sse::{SseDecoder, SseEvent};
use crate::util::{scrub_key, truncate_safe, MAX_ERROR_MESSAGE_CHARS};
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Build the pooled HTTP client for one backend
pub(crate) fn build_client(backend: BackendId) -> Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(format!("{backend}: failed to build HTTP client: {e}")))
}

/// Pull a readable message out of a provider error body
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for pointer in ["/error/message", "/0/error/message", "/message", "/error"] {
            if let Some(message) = value.pointer(pointer).and_then(Value::as_str) {
                return truncate_safe(message.trim(), MAX_ERROR_MESSAGE_CHARS);
            }
        }
    }
    truncate_safe(body.trim(), MAX_ERROR_MESSAGE_CHARS)
}

fn transport_error(backend: BackendId, err: &reqwest::Error, api_key: &str) -> BackendError {
    let mut error = BackendError::transport(backend, err);
    error.message = scrub_key(&error.message, api_key);
    error
}

/// Turn a non-success response into a classified error
pub(crate) async fn error_from_response(
    backend: BackendId,
    response: Response,
    api_key: &str,
) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let mut message = scrub_key(&error_message(&body), api_key);
    if message.is_empty() {
        message = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    BackendError::http(backend, status.as_u16(), message)
}

/// Send a request and decode a JSON success body
pub(crate) async fn send_json<R: DeserializeOwned>(
    backend: BackendId,
    request: RequestBuilder,
    api_key: &str,
) -> std::result::Result<R, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(backend, &e, api_key))?;

    let status = response.status();
    debug!(backend = %backend, status = status.as_u16(), "Response received");
    if !status.is_success() {
        return Err(error_from_response(backend, response, api_key).await);
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(backend, &e, api_key))?;
    serde_json::from_str(&body).map_err(|e| BackendError::invalid_response(backend, e))
}

/// Send a streaming request and yield its server-sent events
pub(crate) fn sse_events(
    backend: BackendId,
    request: RequestBuilder,
    api_key: String,
) -> impl Stream<Item = std::result::Result<SseEvent, BackendError>> + Send + 'static {
    try_stream! {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(backend, &e, &api_key))?;

        if !response.status().is_success() {
            let error = error_from_response(backend, response, &api_key).await;
            Err::<(), _>(error)?;
        } else {
            debug!(backend = %backend, "Stream opened");
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| transport_error(backend, &e, &api_key))?;
                for event in decoder.feed(&chunk) {
                    yield event;
                }
            }
            if let Some(event) = decoder.finish() {
                yield event;
            }
        }
    }
}
