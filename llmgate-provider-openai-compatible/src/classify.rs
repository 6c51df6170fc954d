//! Normalization of provider failures into the gateway taxonomy.

use llmgate_core::{GatewayError, RejectionKind};

/// Classify a transport-level `reqwest` failure.
pub fn classify_transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::ProviderTimeout(err.to_string())
    } else {
        GatewayError::ProviderUnavailable(err.to_string())
    }
}

/// Classify a non-2xx provider response.
///
/// 5xx means the provider itself is failing and the request may succeed
/// elsewhere; everything in the 4xx range is a rejection the caller (or the
/// gateway configuration) is responsible for, so it is never retried.
pub fn classify_status(status: u16, body: &str) -> GatewayError {
    let message = provider_error_message(body)
        .unwrap_or_else(|| format!("provider returned HTTP {status}"));

    match status {
        429 => GatewayError::rejected(RejectionKind::RateLimited, message),
        408 => GatewayError::ProviderTimeout(message),
        400..=499 => {
            if is_content_policy(body) {
                GatewayError::rejected(RejectionKind::ContentPolicy, message)
            } else {
                GatewayError::rejected(RejectionKind::InvalidRequest, message)
            }
        }
        _ => GatewayError::ProviderUnavailable(message),
    }
}

/// Pull the human-readable message out of an OpenAI-style error body.
fn provider_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

fn is_content_policy(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };
    let error = value.get("error");
    let code = error
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or_default();
    let kind = error
        .and_then(|e| e.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or_default();
    code.contains("content_policy")
        || code.contains("content_filter")
        || kind.contains("content_policy")
        || kind.contains("content_filter")
}
