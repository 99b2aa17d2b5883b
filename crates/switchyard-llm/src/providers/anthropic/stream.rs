//! SSE event decoding for the streaming Messages API
//!
//! - `message_start` / `content_block_start` / `content_block_stop`: framing
//! - `content_block_delta`: incremental text
//! - `message_stop`: end of message
//! - `error`: terminal provider error

use super::types::AnthropicErrorDetail;
use crate::backend::BackendId;
use crate::error::BackendError;
use crate::sse::SseEvent;
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::warn;

/// A raw event from the streaming API
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum Event {
    #[serde(rename = "content_block_start")]
    ContentBlockStart { content_block: StartBlock },
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: BlockDelta },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(rename = "error")]
    Error { error: AnthropicErrorDetail },
    /// message_start, ping, message_delta and anything newer
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum StartBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum BlockDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

/// Map Anthropic stream events to text fragments
pub(crate) fn fragments<S>(
    backend: BackendId,
    events: S,
) -> impl Stream<Item = Result<String, BackendError>> + Send + 'static
where
    S: Stream<Item = Result<SseEvent, BackendError>> + Send + 'static,
{
    try_stream! {
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            let event = event?;
            if event.data.trim().is_empty() {
                continue;
            }
            let parsed = match serde_json::from_str::<Event>(&event.data) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(backend = %backend, "Skipping malformed stream event: {e}");
                    continue;
                }
            };
            match parsed {
                Event::ContentBlockStart { content_block: StartBlock::Text { text } }
                | Event::ContentBlockDelta { delta: BlockDelta::TextDelta { text } } => {
                    if !text.is_empty() {
                        yield text;
                    }
                }
                Event::MessageStop => break,
                Event::Error { error } => {
                    let status = error.status();
                    let message = format!("{}: {}", error.r#type, error.message);
                    Err::<(), _>(BackendError::new(backend, status, message))?;
                }
                _ => {}
            }
        }
    }
}
