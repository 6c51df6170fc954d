//! Streaming chunk types and cancellation helpers.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::types::FinishReason;

/// One incremental fragment of a streaming completion.
///
/// A well-formed stream ends with a chunk carrying a non-null
/// `finish_reason`; a stream that stops any other way surfaces
/// [`GatewayError::StreamInterrupted`] instead of ending silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    pub id: String,
    /// The model identifier that is serving the stream.
    pub model_id: String,
    /// Incremental content fragment. May be empty on the final chunk.
    pub delta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl ChatChunk {
    /// Whether this chunk terminates the stream.
    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// A lazy sequence of chat chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, GatewayError>> + Send>>;

/// A handle that can be used to request cancellation of a stream.
///
/// Cancelling stops consumption as soon as possible; dropping the cancelled
/// stream closes the underlying HTTP connection so the provider stops
/// generating tokens.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Make a [`ChunkStream`] cancellable and return its cancel handle.
pub fn make_cancellable_stream(stream: ChunkStream) -> (ChunkStream, CancelHandle) {
    let handle = CancelHandle::new();
    let token = handle.token.clone();
    let mut inner = stream;
    let s = async_stream::stream! {
        use futures::StreamExt;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                item = inner.next() => {
                    let Some(item) = item else { break };
                    yield item;
                }
            }
        }
    };
    (Box::pin(s), handle)
}

/// A [`ChunkStream`] paired with its [`CancelHandle`].
pub struct ChunkStreamHandle {
    pub stream: ChunkStream,
    pub cancel: CancelHandle,
}

impl ChunkStreamHandle {
    /// Wrap a stream so it can be cancelled out-of-band.
    pub fn new(stream: ChunkStream) -> Self {
        let (stream, cancel) = make_cancellable_stream(stream);
        Self { stream, cancel }
    }

    pub fn into_parts(self) -> (ChunkStream, CancelHandle) {
        (self.stream, self.cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FinishReason;
    use futures_util::StreamExt;

    fn chunk(delta: &str, finish: Option<FinishReason>) -> ChatChunk {
        ChatChunk {
            id: "chatcmpl-test".to_string(),
            model_id: "m".to_string(),
            delta: delta.to_string(),
            finish_reason: finish,
        }
    }

    #[tokio::test]
    async fn cancelled_stream_stops_early() {
        let items: Vec<Result<ChatChunk, GatewayError>> = vec![
            Ok(chunk("a", None)),
            Ok(chunk("b", None)),
            Ok(chunk("", Some(FinishReason::Stop))),
        ];
        let inner: ChunkStream = Box::pin(futures::stream::iter(items));
        let (mut stream, cancel) = make_cancellable_stream(inner);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.delta, "a");

        cancel.cancel();
        assert!(stream.next().await.is_none());
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn uncancelled_stream_passes_everything_through() {
        let items: Vec<Result<ChatChunk, GatewayError>> =
            vec![Ok(chunk("a", None)), Ok(chunk("", Some(FinishReason::Stop)))];
        let inner: ChunkStream = Box::pin(futures::stream::iter(items));
        let handle = ChunkStreamHandle::new(inner);
        let (stream, _cancel) = handle.into_parts();

        let collected: Vec<_> = stream.collect().await;
        assert_eq!(collected.len(), 2);
        assert!(collected.last().unwrap().as_ref().unwrap().is_final());
    }
}
