//! Request routing with bounded fallback.

use std::sync::Arc;

use tracing::{info, warn};

use llmgate_core::streaming::ChunkStream;
use llmgate_core::types::{ChatRequest, ChatResponse};
use llmgate_core::GatewayError;
use llmgate_registry::{ModelDescriptor, ModelRegistry};

use crate::factory::AdapterFactory;

/// The payload of a successful dispatch.
pub enum Reply {
    Full(ChatResponse),
    Stream(ChunkStream),
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(response) => f.debug_tuple("Full").field(response).finish(),
            Self::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// A successful dispatch plus its routing receipt.
#[derive(Debug)]
pub struct Dispatched {
    /// The model identifier that actually served the request.
    pub served_by: String,
    /// The originally requested identifier when one fallback hop occurred.
    pub fallback_from: Option<String>,
    pub reply: Reply,
}

/// Resolves a request's model identifier, obtains the adapter, invokes it,
/// and applies the fallback policy on failure.
///
/// Fallback is bounded to exactly one hop per request: a transient provider
/// failure (`ProviderUnavailable`, `ProviderTimeout`) re-enters resolution
/// once with the descriptor's configured `fallback_model`; a failure of the
/// fallback itself surfaces as-is. Rejections are never retried, and a
/// nonexistent model fails immediately without touching the factory.
pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
    factory: Arc<AdapterFactory>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModelRegistry>, factory: Arc<AdapterFactory>) -> Self {
        Self { registry, factory }
    }

    pub async fn dispatch(&self, request: ChatRequest) -> Result<Dispatched, GatewayError> {
        request.validate()?;

        let descriptor = self.registry.resolve(&request.model_id)?;
        info!(
            model_id = %descriptor.model_id,
            messages = request.messages.len(),
            stream = request.stream,
            "dispatching chat completion"
        );

        match self.attempt(&descriptor, &request).await {
            Ok(reply) => Ok(Dispatched {
                served_by: descriptor.model_id.clone(),
                fallback_from: None,
                reply,
            }),
            Err(err) if err.is_retryable() => {
                let Some(fallback_id) = descriptor.fallback_model.clone() else {
                    return Err(err);
                };
                warn!(
                    model_id = %descriptor.model_id,
                    fallback = %fallback_id,
                    error = %err,
                    "transient provider failure, taking fallback hop"
                );

                let fallback = self.registry.resolve(&fallback_id)?;
                let reply = self.attempt(&fallback, &request).await?;
                Ok(Dispatched {
                    served_by: fallback.model_id.clone(),
                    fallback_from: Some(descriptor.model_id.clone()),
                    reply,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// One dispatch attempt against one descriptor.
    ///
    /// For streaming requests this covers everything up to stream
    /// establishment; once chunks are flowing, failures terminate the stream
    /// in-band and are never retried (partial output has already been
    /// delivered).
    async fn attempt(
        &self,
        descriptor: &ModelDescriptor,
        request: &ChatRequest,
    ) -> Result<Reply, GatewayError> {
        if request.stream && !descriptor.supports_streaming {
            return Err(GatewayError::invalid_request(format!(
                "model '{}' does not support streaming",
                descriptor.model_id
            )));
        }

        let adapter = self.factory.adapter_for(descriptor).await?;
        if request.stream {
            Ok(Reply::Stream(adapter.stream(descriptor, request).await?))
        } else {
            Ok(Reply::Full(adapter.complete(descriptor, request).await?))
        }
    }
}
