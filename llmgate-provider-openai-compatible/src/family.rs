//! The closed set of provider adapter variants.

use llmgate_core::streaming::{ChunkStream, ChunkStreamHandle};
use llmgate_core::types::{ChatRequest, ChatResponse, HealthStatus, ProviderFamily};
use llmgate_core::GatewayError;
use llmgate_registry::{CredentialStore, ModelDescriptor};

use crate::client::OpenAiCompatibleAdapter;
use crate::config::AdapterConfig;

/// One provider adapter, tagged by family.
///
/// All current families speak the same wire protocol, so every variant wraps
/// the one OpenAI-compatible implementation configured for its deployment
/// target. The tag keeps dispatch a closed set selected at construction
/// instead of open-ended dynamic dispatch.
#[derive(Debug)]
pub enum ProviderAdapter {
    CloudApi(OpenAiCompatibleAdapter),
    SelfHosted(OpenAiCompatibleAdapter),
    CompatibleEndpoint(OpenAiCompatibleAdapter),
}

impl ProviderAdapter {
    /// Build the adapter for a descriptor, resolving its credential first.
    ///
    /// The credential store is consulted only here; the resolved secret lives
    /// inside the adapter's request headers and is dropped with it.
    pub async fn for_descriptor(
        descriptor: &ModelDescriptor,
        credentials: &dyn CredentialStore,
    ) -> Result<Self, GatewayError> {
        let api_key = match &descriptor.credential_ref {
            Some(credential_ref) => Some(credentials.get_credential(credential_ref).await?),
            None => None,
        };

        if descriptor.provider_family == ProviderFamily::CloudApi && api_key.is_none() {
            return Err(GatewayError::AdapterConstruction(format!(
                "model '{}' targets a cloud API but carries no credential reference",
                descriptor.model_id
            )));
        }

        let inner = OpenAiCompatibleAdapter::new(AdapterConfig::from_descriptor(
            descriptor, api_key,
        ))?;

        Ok(match descriptor.provider_family {
            ProviderFamily::CloudApi => Self::CloudApi(inner),
            ProviderFamily::SelfHosted => Self::SelfHosted(inner),
            ProviderFamily::CompatibleEndpoint => Self::CompatibleEndpoint(inner),
        })
    }

    pub fn provider_family(&self) -> ProviderFamily {
        match self {
            Self::CloudApi(_) => ProviderFamily::CloudApi,
            Self::SelfHosted(_) => ProviderFamily::SelfHosted,
            Self::CompatibleEndpoint(_) => ProviderFamily::CompatibleEndpoint,
        }
    }

    fn inner(&self) -> &OpenAiCompatibleAdapter {
        match self {
            Self::CloudApi(a) | Self::SelfHosted(a) | Self::CompatibleEndpoint(a) => a,
        }
    }

    pub async fn complete(
        &self,
        descriptor: &ModelDescriptor,
        request: &ChatRequest,
    ) -> Result<ChatResponse, GatewayError> {
        self.inner().complete(descriptor, request).await
    }

    pub async fn stream(
        &self,
        descriptor: &ModelDescriptor,
        request: &ChatRequest,
    ) -> Result<ChunkStream, GatewayError> {
        self.inner().stream(descriptor, request).await
    }

    /// Like [`stream`](Self::stream), but wrapped so the caller can cancel
    /// out-of-band (e.g. on client disconnect).
    pub async fn stream_with_cancel(
        &self,
        descriptor: &ModelDescriptor,
        request: &ChatRequest,
    ) -> Result<ChunkStreamHandle, GatewayError> {
        let stream = self.inner().stream(descriptor, request).await?;
        Ok(ChunkStreamHandle::new(stream))
    }

    pub async fn health_check(&self, descriptor: &ModelDescriptor) -> HealthStatus {
        self.inner().health_check(descriptor).await
    }
}
