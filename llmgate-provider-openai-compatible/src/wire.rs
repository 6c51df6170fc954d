//! OpenAI-compatible wire types and their canonical conversions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use llmgate_core::types::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FinishReason, MessageRole, Usage,
};
use llmgate_registry::ModelDescriptor;

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

/// Build the provider request body, filling omitted sampling parameters from
/// the descriptor's defaults. Caller-provided values pass through unmodified.
pub(crate) fn completion_body(
    descriptor: &ModelDescriptor,
    request: &ChatRequest,
    stream: bool,
) -> ChatCompletionBody {
    ChatCompletionBody {
        model: descriptor.model_id.clone(),
        messages: request.messages.clone(),
        max_tokens: request.max_tokens.or(descriptor.default_params.max_tokens),
        temperature: request
            .temperature
            .or(descriptor.default_params.temperature),
        stream,
    }
}

/// Non-streaming completion response as the provider sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletion {
    pub id: Option<String>,
    pub created: Option<i64>,
    #[serde(default)]
    pub choices: Vec<WireChoice>,
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    pub message: Option<WireMessage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

pub(crate) fn generated_completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4().simple())
}

impl ChatCompletion {
    /// Normalize into the canonical response shape.
    ///
    /// `model_id` is the logical identifier that served the request; the
    /// provider's own `model` echo is ignored so callers always see registry
    /// identifiers.
    pub(crate) fn into_canonical(self, model_id: &str) -> ChatResponse {
        let created_at = self
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        let choices = self
            .choices
            .into_iter()
            .map(|choice| Choice {
                role: MessageRole::Assistant,
                content: choice
                    .message
                    .and_then(|m| m.content)
                    .unwrap_or_default(),
                finish_reason: choice
                    .finish_reason
                    .as_deref()
                    .map(FinishReason::from_wire)
                    .unwrap_or(FinishReason::Unknown),
            })
            .collect();

        let usage = self.usage.map(|u| {
            let prompt = u.prompt_tokens.unwrap_or(0);
            let completion = u.completion_tokens.unwrap_or(0);
            Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: u.total_tokens.unwrap_or(prompt + completion),
            }
        });

        ChatResponse {
            id: self.id.unwrap_or_else(generated_completion_id),
            model_id: model_id.to_string(),
            created_at,
            choices,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmgate_core::types::ProviderFamily;
    use llmgate_registry::{DefaultParams, TimeoutPolicy};

    fn descriptor() -> ModelDescriptor {
        ModelDescriptor {
            model_id: "llama-8b".to_string(),
            display_name: "Llama 8B".to_string(),
            provider_family: ProviderFamily::SelfHosted,
            endpoint: "http://localhost:8001/v1".to_string(),
            credential_ref: None,
            supports_streaming: true,
            max_context_tokens: 131072,
            default_params: DefaultParams {
                temperature: Some(0.7),
                max_tokens: Some(2048),
            },
            timeouts: TimeoutPolicy::default(),
            fallback_model: None,
        }
    }

    #[test]
    fn omitted_params_come_from_descriptor_defaults() {
        let request = ChatRequest::new("llama-8b", vec![ChatMessage::user("hi")]);
        let body = completion_body(&descriptor(), &request, false);
        assert_eq!(body.temperature, Some(0.7));
        assert_eq!(body.max_tokens, Some(2048));
        assert!(!body.stream);
    }

    #[test]
    fn caller_params_pass_through_unmodified() {
        let request = ChatRequest::new("llama-8b", vec![ChatMessage::user("hi")])
            .with_temperature(1.5)
            .with_max_tokens(16);
        let body = completion_body(&descriptor(), &request, true);
        assert_eq!(body.temperature, Some(1.5));
        assert_eq!(body.max_tokens, Some(16));
        assert!(body.stream);
    }

    #[test]
    fn canonical_conversion_maps_length_cutoff_to_finish_reason() {
        let raw = r#"{
            "id": "chatcmpl-abc",
            "created": 1718345013,
            "model": "provider-side-name",
            "choices": [{
                "message": {"role": "assistant", "content": "truncated text"},
                "finish_reason": "length"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20}
        }"#;
        let completion: ChatCompletion = serde_json::from_str(raw).unwrap();
        let response = completion.into_canonical("llama-8b");

        assert_eq!(response.id, "chatcmpl-abc");
        assert_eq!(response.model_id, "llama-8b");
        assert_eq!(response.finish_reason(), Some(FinishReason::Length));
        assert_eq!(response.content_text(), Some("truncated text"));

        let usage = response.usage.unwrap();
        assert_eq!(usage.total_tokens, 30);
    }

    #[test]
    fn missing_id_gets_a_generated_one() {
        let completion: ChatCompletion = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let response = completion.into_canonical("m");
        assert!(response.id.starts_with("chatcmpl-"));
    }
}
