//! Immutable per-model descriptors and provider configuration identity.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use llmgate_core::types::ProviderFamily;

/// Default sampling parameters applied when the caller omits them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Deadlines for talking to one provider configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    /// TCP/TLS connection establishment.
    pub connect: Duration,
    /// Whole-request deadline for completions (and the streaming handshake).
    pub request: Duration,
    /// Deadline for the health probe. Kept short so a dead provider cannot
    /// stall the health sweep.
    pub health: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(60),
            health: Duration::from_secs(5),
        }
    }
}

/// Identity of one provider configuration.
///
/// The adapter cache is keyed by this, not by model identifier: several
/// logical models may share one endpoint/credential pair and therefore one
/// live adapter handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    pub family: ProviderFamily,
    pub endpoint: String,
    pub credential_ref: Option<String>,
}

/// Immutable record describing one logical model.
///
/// Created at load time from validated configuration and never mutated
/// afterwards; replacing a descriptor requires a full registry reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    /// Unique caller-facing identifier, also sent to the provider as the
    /// model name.
    pub model_id: String,
    /// Human-readable name for listing surfaces.
    pub display_name: String,
    pub provider_family: ProviderFamily,
    /// Base URL of the provider API, validated and normalized at load.
    pub endpoint: String,
    /// Opaque handle resolved through the credential store at adapter
    /// construction time.
    pub credential_ref: Option<String>,
    pub supports_streaming: bool,
    pub max_context_tokens: u32,
    pub default_params: DefaultParams,
    pub timeouts: TimeoutPolicy,
    /// Model identifier to try once after a transient failure, if any.
    pub fallback_model: Option<String>,
}

impl ModelDescriptor {
    /// The provider configuration identity this descriptor maps onto.
    pub fn provider_key(&self) -> ProviderKey {
        ProviderKey {
            family: self.provider_family,
            endpoint: self.endpoint.clone(),
            credential_ref: self.credential_ref.clone(),
        }
    }
}
