//! Provider families, finish reasons, usage accounting, and health state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// A class of backends sharing request/response shape.
///
/// All three current families speak the OpenAI chat-completion wire format;
/// they differ in deployment target and credential expectations, which is why
/// they stay distinguishable in configuration and health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// A managed cloud API; always requires a credential.
    CloudApi,
    /// A self-hosted OpenAI-compatible inference server (e.g. vLLM).
    SelfHosted,
    /// Any other OpenAI-compatible endpoint.
    CompatibleEndpoint,
}

impl ProviderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CloudApi => "cloud_api",
            Self::SelfHosted => "self_hosted",
            Self::CompatibleEndpoint => "compatible_endpoint",
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural completion or stop sequence.
    Stop,
    /// Provider-side length cutoff (`max_tokens` reached). Not an error.
    Length,
    /// The provider filtered the output on policy grounds.
    ContentFilter,
    /// The provider reported no recognizable reason.
    Unknown,
}

impl FinishReason {
    /// Map an OpenAI-compatible wire value onto the canonical enum.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "stop" => Self::Stop,
            "length" | "max_tokens" => Self::Length,
            "content_filter" => Self::ContentFilter,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
            Self::Unknown => "unknown",
        }
    }
}

/// Token accounting as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Health of one provider configuration as last observed.
///
/// Written only by the health-check routine; routing reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub provider_family: ProviderFamily,
    pub model_id: String,
    pub healthy: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_error: Option<ErrorKind>,
}

impl HealthStatus {
    /// Status for a provider that has never been probed. Routable until a
    /// check says otherwise.
    pub fn unchecked(provider_family: ProviderFamily, model_id: impl Into<String>) -> Self {
        Self {
            provider_family,
            model_id: model_id.into(),
            healthy: true,
            last_checked_at: None,
            last_error: None,
        }
    }

    pub fn healthy(provider_family: ProviderFamily, model_id: impl Into<String>) -> Self {
        Self {
            provider_family,
            model_id: model_id.into(),
            healthy: true,
            last_checked_at: Some(Utc::now()),
            last_error: None,
        }
    }

    pub fn unhealthy(
        provider_family: ProviderFamily,
        model_id: impl Into<String>,
        cause: ErrorKind,
    ) -> Self {
        Self {
            provider_family,
            model_id: model_id.into(),
            healthy: false,
            last_checked_at: Some(Utc::now()),
            last_error: Some(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_reason_wire_mapping() {
        assert_eq!(FinishReason::from_wire("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from_wire("length"), FinishReason::Length);
        assert_eq!(FinishReason::from_wire("max_tokens"), FinishReason::Length);
        assert_eq!(
            FinishReason::from_wire("content_filter"),
            FinishReason::ContentFilter
        );
        assert_eq!(FinishReason::from_wire("tool_calls"), FinishReason::Unknown);
    }

    #[test]
    fn provider_family_serializes_snake_case() {
        let json = serde_json::to_string(&ProviderFamily::SelfHosted).unwrap();
        assert_eq!(json, "\"self_hosted\"");
        let back: ProviderFamily = serde_json::from_str("\"cloud_api\"").unwrap();
        assert_eq!(back, ProviderFamily::CloudApi);
    }

    #[test]
    fn unchecked_status_is_routable() {
        let status = HealthStatus::unchecked(ProviderFamily::CompatibleEndpoint, "m");
        assert!(status.healthy);
        assert!(status.last_checked_at.is_none());
        assert!(status.last_error.is_none());
    }
}
