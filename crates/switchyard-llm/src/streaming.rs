//! Streaming variant
//!
//! A stream is a single attempt against the routed backend. Failures end the
//! stream with an error item and are not retried through the fallback chain.

use crate::backend::{Backend, BackendId, FragmentStream};
use crate::completion::ChatOptions;
use crate::error::{Error, Result};
use crate::message::Message;
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Text fragments of a streamed completion
///
/// Finite and not restartable. The first `Err` item is also the last item.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

enum Step {
    Fragment(String),
    Failed(Error),
    Finished,
    Cancelled,
}

/// Open a stream on `backend`, ending early if `cancel` fires
pub(crate) fn open(
    backend: &dyn Backend,
    messages: &[Message],
    options: &ChatOptions,
    cancel: Option<CancellationToken>,
) -> TextStream {
    let id = backend.id();
    let fragments = backend.stream_chat(messages, options);
    Box::pin(relay(id, fragments, cancel.unwrap_or_default()))
}

fn relay(
    id: BackendId,
    mut fragments: FragmentStream,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<String>> + Send + 'static {
    stream! {
        let mut count = 0usize;
        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                item = fragments.next() => match item {
                    Some(Ok(text)) => Step::Fragment(text),
                    Some(Err(err)) => Step::Failed(Error::Backend(err)),
                    None => Step::Finished,
                },
            };

            match step {
                Step::Fragment(text) if text.is_empty() => {}
                Step::Fragment(text) => {
                    count += 1;
                    yield Ok(text);
                }
                Step::Failed(err) => {
                    debug!(backend = %id, fragments = count, "Stream failed: {err}");
                    yield Err(err);
                    break;
                }
                Step::Cancelled => {
                    debug!(backend = %id, fragments = count, "Stream cancelled");
                    yield Err(Error::Cancelled);
                    break;
                }
                Step::Finished => {
                    debug!(backend = %id, fragments = count, "Stream finished");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBackend, MockOutcome};
    use std::time::Duration;

    fn messages() -> Vec<Message> {
        vec![Message::user("hi")]
    }

    #[tokio::test]
    async fn test_fragments_arrive_in_order() {
        let backend = MockBackend::new(BackendId::Groq).with_stream(vec![
            MockOutcome::reply("a"),
            MockOutcome::reply(""),
            MockOutcome::reply("b"),
        ]);
        let stream = open(&backend, &messages(), &ChatOptions::default(), None);
        let items: Vec<String> = stream.map(|i| i.unwrap()).collect().await;
        assert_eq!(items, vec!["a", "b"]);
        assert_eq!(backend.stream_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_terminal() {
        let backend = MockBackend::new(BackendId::OpenAi).with_stream(vec![
            MockOutcome::reply("partial"),
            MockOutcome::http(500, "internal server error"),
            MockOutcome::reply("never"),
        ]);
        let items: Vec<Result<String>> =
            open(&backend, &messages(), &ChatOptions::default(), None)
                .collect()
                .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(matches!(&items[1], Err(Error::Backend(e)) if e.status == Some(500)));
    }

    #[tokio::test]
    async fn test_cancellation_ends_a_stalled_stream() {
        let backend = MockBackend::new(BackendId::Gemini)
            .with_stream(vec![MockOutcome::reply("first"), MockOutcome::Hang]);
        let token = CancellationToken::new();
        let mut stream = open(
            &backend,
            &messages(),
            &ChatOptions::default(),
            Some(token.clone()),
        );

        assert_eq!(stream.next().await.unwrap().unwrap(), "first");
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        assert!(matches!(stream.next().await, Some(Err(Error::Cancelled))));
        assert!(stream.next().await.is_none());
        canceller.await.unwrap();
    }
}
