//! SSE event payloads to canonical chunk conversion.

use serde::Deserialize;

use llmgate_core::streaming::ChatChunk;
use llmgate_core::types::FinishReason;
use llmgate_core::GatewayError;

use crate::wire::generated_completion_id;

/// One `chat.completion.chunk` SSE payload.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    id: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

pub(crate) const DONE_MARKER: &str = "[DONE]";

/// Stateful converter from SSE `data:` payloads to [`ChatChunk`]s.
///
/// Tracks the stream identifier across chunks and whether a finish reason has
/// been observed, so the caller can distinguish a naturally finished stream
/// from one that stopped silently.
#[derive(Debug)]
pub(crate) struct SseChunkConverter {
    model_id: String,
    stream_id: Option<String>,
    finished: bool,
}

impl SseChunkConverter {
    pub(crate) fn new(model_id: String) -> Self {
        Self {
            model_id,
            stream_id: None,
            finished: false,
        }
    }

    /// Whether a finish-reason-bearing chunk has been produced.
    pub(crate) fn finished(&self) -> bool {
        self.finished
    }

    /// Convert one SSE payload. Returns `Ok(None)` for keep-alive chunks that
    /// carry neither content nor a finish reason (e.g. the initial role
    /// chunk or a trailing usage-only chunk).
    pub(crate) fn convert(&mut self, data: &str) -> Result<Option<ChatChunk>, GatewayError> {
        let event: StreamEvent = serde_json::from_str(data).map_err(|e| {
            GatewayError::StreamInterrupted(format!("malformed stream chunk: {e}"))
        })?;

        if let Some(id) = event.id
            && !id.is_empty()
            && self.stream_id.is_none()
        {
            self.stream_id = Some(id);
        }

        let Some(choice) = event.choices.into_iter().next() else {
            return Ok(None);
        };

        let delta = choice
            .delta
            .and_then(|d| d.content)
            .unwrap_or_default();
        let finish_reason = choice
            .finish_reason
            .as_deref()
            .map(FinishReason::from_wire);

        if delta.is_empty() && finish_reason.is_none() {
            return Ok(None);
        }

        if finish_reason.is_some() {
            self.finished = true;
        }

        let id = self
            .stream_id
            .get_or_insert_with(generated_completion_id)
            .clone();

        Ok(Some(ChatChunk {
            id,
            model_id: self.model_id.clone(),
            delta,
            finish_reason,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_only_chunks_are_skipped() {
        let mut converter = SseChunkConverter::new("m".to_string());
        let chunk = converter
            .convert(r#"{"id":"c1","choices":[{"delta":{"role":"assistant"},"finish_reason":null}]}"#)
            .unwrap();
        assert!(chunk.is_none());
        assert!(!converter.finished());
    }

    #[test]
    fn content_deltas_carry_the_stream_id() {
        let mut converter = SseChunkConverter::new("m".to_string());
        converter
            .convert(r#"{"id":"c1","choices":[{"delta":{"role":"assistant"},"finish_reason":null}]}"#)
            .unwrap();
        let chunk = converter
            .convert(r#"{"id":"c1","choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk.id, "c1");
        assert_eq!(chunk.delta, "Hello");
        assert!(chunk.finish_reason.is_none());
    }

    #[test]
    fn finish_reason_marks_the_converter_finished() {
        let mut converter = SseChunkConverter::new("m".to_string());
        let chunk = converter
            .convert(r#"{"id":"c1","choices":[{"delta":{},"finish_reason":"stop"}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk.finish_reason, Some(FinishReason::Stop));
        assert!(chunk.delta.is_empty());
        assert!(converter.finished());
    }

    #[test]
    fn malformed_payloads_interrupt_the_stream() {
        let mut converter = SseChunkConverter::new("m".to_string());
        let err = converter.convert("{not json").unwrap_err();
        assert!(matches!(err, GatewayError::StreamInterrupted(_)));
    }

    #[test]
    fn usage_only_chunks_are_skipped() {
        let mut converter = SseChunkConverter::new("m".to_string());
        let chunk = converter
            .convert(r#"{"id":"c1","choices":[],"usage":{"prompt_tokens":1,"completion_tokens":2}}"#)
            .unwrap();
        assert!(chunk.is_none());
    }

    #[test]
    fn generates_an_id_when_the_provider_omits_one() {
        let mut converter = SseChunkConverter::new("m".to_string());
        let chunk = converter
            .convert(r#"{"choices":[{"delta":{"content":"x"},"finish_reason":null}]}"#)
            .unwrap()
            .unwrap();
        assert!(chunk.id.starts_with("chatcmpl-"));
    }
}
