//! The OpenAI-compatible HTTP client.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use llmgate_core::streaming::ChunkStream;
use llmgate_core::types::{ChatRequest, ChatResponse, HealthStatus};
use llmgate_core::GatewayError;
use llmgate_registry::ModelDescriptor;

use crate::classify::{classify_status, classify_transport};
use crate::config::AdapterConfig;
use crate::sse::{SseChunkConverter, DONE_MARKER};
use crate::wire;

/// A live connection to one provider configuration.
///
/// Stateless beyond the pooled HTTP client, so one instance is safely shared
/// by every concurrent request targeting the same endpoint/credential pair.
pub struct OpenAiCompatibleAdapter {
    base_url: String,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|_| {
                    GatewayError::AdapterConstruction(
                        "credential contains bytes not valid in an Authorization header"
                            .to_string(),
                    )
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                GatewayError::AdapterConstruction(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
            http,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    /// Non-streaming completion.
    pub async fn complete(
        &self,
        descriptor: &ModelDescriptor,
        request: &ChatRequest,
    ) -> Result<ChatResponse, GatewayError> {
        let body = wire::completion_body(descriptor, request, false);
        debug!(model_id = %descriptor.model_id, "sending chat completion");

        let response = self
            .http
            .post(self.chat_completions_url())
            .headers(self.headers.clone())
            .timeout(descriptor.timeouts.request)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &text));
        }

        let completion: wire::ChatCompletion = response.json().await.map_err(|e| {
            GatewayError::ProviderUnavailable(format!("malformed completion response: {e}"))
        })?;
        Ok(completion.into_canonical(&descriptor.model_id))
    }

    /// Streaming completion.
    ///
    /// Handshake failures surface through the returned `Result` and carry the
    /// same classification as [`complete`](Self::complete); anything that goes
    /// wrong after the first byte terminates the stream with
    /// [`GatewayError::StreamInterrupted`]. Dropping the stream closes the
    /// connection.
    pub async fn stream(
        &self,
        descriptor: &ModelDescriptor,
        request: &ChatRequest,
    ) -> Result<ChunkStream, GatewayError> {
        let body = wire::completion_body(descriptor, request, true);
        debug!(model_id = %descriptor.model_id, "opening chat completion stream");

        let response = self
            .http
            .post(self.chat_completions_url())
            .headers(self.headers.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .timeout(descriptor.timeouts.request)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &text));
        }

        let mut events = response.bytes_stream().eventsource();
        let mut converter = SseChunkConverter::new(descriptor.model_id.clone());

        let stream = async_stream::try_stream! {
            while let Some(event) = events.next().await {
                let event = event.map_err(|e| {
                    GatewayError::StreamInterrupted(format!("transport failed mid-stream: {e}"))
                })?;
                if event.data.trim() == DONE_MARKER {
                    break;
                }
                if let Some(chunk) = converter.convert(&event.data)? {
                    yield chunk;
                }
            }
            if !converter.finished() {
                Err(GatewayError::StreamInterrupted(
                    "stream ended before the provider sent a finish reason".to_string(),
                ))?;
            }
        };

        Ok(Box::pin(stream))
    }

    /// Probe the provider with a cheap models-list call.
    ///
    /// Never fails: any error is folded into `healthy = false` with the
    /// causing kind recorded.
    pub async fn health_check(&self, descriptor: &ModelDescriptor) -> HealthStatus {
        let probe = self
            .http
            .get(self.models_url())
            .headers(self.headers.clone())
            .timeout(descriptor.timeouts.health)
            .send()
            .await;

        match probe {
            Ok(response) if response.status().is_success() => {
                HealthStatus::healthy(descriptor.provider_family, &descriptor.model_id)
            }
            Ok(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                let err = classify_status(status.as_u16(), &text);
                warn!(
                    model_id = %descriptor.model_id,
                    status = status.as_u16(),
                    "health probe rejected"
                );
                HealthStatus::unhealthy(
                    descriptor.provider_family,
                    &descriptor.model_id,
                    err.kind(),
                )
            }
            Err(e) => {
                let err = classify_transport(e);
                warn!(model_id = %descriptor.model_id, error = %err, "health probe failed");
                HealthStatus::unhealthy(
                    descriptor.provider_family,
                    &descriptor.model_id,
                    err.kind(),
                )
            }
        }
    }
}

impl std::fmt::Debug for OpenAiCompatibleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleAdapter")
            .field("base_url", &self.base_url)
            .finish()
    }
}
