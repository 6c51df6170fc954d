//! Gateway error taxonomy.
//!
//! Every error surfaced by the core carries a closed [`ErrorKind`] tag so the
//! inbound layer can map it to a transport status without re-deriving
//! provider-specific semantics.

use serde::{Deserialize, Serialize};

/// Sub-kinds of a provider rejection.
///
/// A rejection is caller-attributable: retrying the same request against a
/// different provider will not fix it, so routing never retries these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Malformed or unacceptable request parameters.
    InvalidRequest,
    /// The provider throttled the request.
    RateLimited,
    /// The provider refused the content on policy grounds.
    ContentPolicy,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::RateLimited => "rate_limited",
            Self::ContentPolicy => "content_policy",
        }
    }
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed tag identifying the class of a [`GatewayError`].
///
/// `ProviderRejected` sub-kinds are flattened into this enum so a single tag
/// is enough to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownModel,
    InvalidConfig,
    AdapterConstruction,
    CredentialUnavailable,
    ProviderUnavailable,
    ProviderTimeout,
    InvalidRequest,
    RateLimited,
    ContentPolicy,
    StreamInterrupted,
}

/// Unified error type for the gateway core.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested model identifier has no registry entry.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Configuration failed load-time validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An adapter could not be constructed from its descriptor.
    #[error("Adapter construction failed: {0}")]
    AdapterConstruction(String),

    /// The referenced credential could not be resolved.
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    /// The provider could not be reached or answered with a server failure.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No response from the provider within the configured deadline.
    #[error("Provider timed out: {0}")]
    ProviderTimeout(String),

    /// The provider returned a client-facing rejection.
    #[error("Provider rejected request ({kind}): {message}")]
    ProviderRejected {
        kind: RejectionKind,
        message: String,
    },

    /// A streaming response failed after it had started.
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),
}

impl GatewayError {
    /// Shorthand for a [`GatewayError::ProviderRejected`].
    pub fn rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self::ProviderRejected {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an invalid-request rejection.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::rejected(RejectionKind::InvalidRequest, message)
    }

    /// The closed tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownModel(_) => ErrorKind::UnknownModel,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::AdapterConstruction(_) => ErrorKind::AdapterConstruction,
            Self::CredentialUnavailable(_) => ErrorKind::CredentialUnavailable,
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::ProviderTimeout(_) => ErrorKind::ProviderTimeout,
            Self::ProviderRejected { kind, .. } => match kind {
                RejectionKind::InvalidRequest => ErrorKind::InvalidRequest,
                RejectionKind::RateLimited => ErrorKind::RateLimited,
                RejectionKind::ContentPolicy => ErrorKind::ContentPolicy,
            },
            Self::StreamInterrupted(_) => ErrorKind::StreamInterrupted,
        }
    }

    /// Whether routing may retry this failure against a fallback model.
    ///
    /// Only transient provider failures qualify; rejections are
    /// caller-attributable and resolution/construction errors are surfaced
    /// immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::ProviderTimeout(_)
        )
    }
}
