//! Declarative registry configuration.
//!
//! Configuration is validated entirely at load time so malformed entries fail
//! at startup rather than at first use.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use llmgate_core::GatewayError;
use llmgate_core::types::ProviderFamily;

use crate::descriptor::{DefaultParams, ModelDescriptor, TimeoutPolicy};

/// One model entry as it appears in the configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub model_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub provider_family: ProviderFamily,
    pub endpoint: String,
    #[serde(default)]
    pub credential_ref: Option<String>,
    #[serde(default = "default_supports_streaming")]
    pub supports_streaming: bool,
    pub max_context_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub health_timeout_ms: Option<u64>,
    #[serde(default)]
    pub fallback_model: Option<String>,
}

fn default_supports_streaming() -> bool {
    true
}

/// The full registry configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub models: Vec<ModelEntry>,
}

impl RegistryConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(raw).map_err(|e| {
            GatewayError::InvalidConfig(format!("failed to parse registry configuration: {e}"))
        })
    }

    /// Validate every entry and convert into immutable descriptors,
    /// preserving document order.
    pub fn into_descriptors(self) -> Result<Vec<ModelDescriptor>, GatewayError> {
        let known_ids: HashSet<&str> = self.models.iter().map(|m| m.model_id.as_str()).collect();
        let mut seen = HashSet::new();
        let mut descriptors = Vec::with_capacity(self.models.len());

        for entry in &self.models {
            validate_entry(entry, &known_ids)?;
            if !seen.insert(entry.model_id.clone()) {
                return Err(GatewayError::InvalidConfig(format!(
                    "duplicate model_id '{}'",
                    entry.model_id
                )));
            }
            descriptors.push(entry.to_descriptor());
        }
        Ok(descriptors)
    }
}

impl ModelEntry {
    fn to_descriptor(&self) -> ModelDescriptor {
        let defaults = TimeoutPolicy::default();
        ModelDescriptor {
            model_id: self.model_id.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.model_id.clone()),
            provider_family: self.provider_family,
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            credential_ref: self.credential_ref.clone(),
            supports_streaming: self.supports_streaming,
            max_context_tokens: self.max_context_tokens,
            default_params: DefaultParams {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            timeouts: TimeoutPolicy {
                connect: self
                    .connect_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.connect),
                request: self
                    .request_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.request),
                health: self
                    .health_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.health),
            },
            fallback_model: self.fallback_model.clone(),
        }
    }
}

fn validate_entry(entry: &ModelEntry, known_ids: &HashSet<&str>) -> Result<(), GatewayError> {
    if entry.model_id.trim().is_empty() {
        return Err(GatewayError::InvalidConfig(
            "model_id must not be empty".to_string(),
        ));
    }

    let url = reqwest::Url::parse(&entry.endpoint).map_err(|e| {
        GatewayError::InvalidConfig(format!(
            "model '{}': invalid endpoint '{}': {e}",
            entry.model_id, entry.endpoint
        ))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::InvalidConfig(format!(
            "model '{}': endpoint must be http(s), got '{}'",
            entry.model_id,
            url.scheme()
        )));
    }

    if entry.max_context_tokens == 0 {
        return Err(GatewayError::InvalidConfig(format!(
            "model '{}': max_context_tokens must be positive",
            entry.model_id
        )));
    }

    if let Some(temperature) = entry.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(GatewayError::InvalidConfig(format!(
            "model '{}': temperature {temperature} is outside 0.0..=2.0",
            entry.model_id
        )));
    }

    if entry.provider_family == ProviderFamily::CloudApi && entry.credential_ref.is_none() {
        return Err(GatewayError::InvalidConfig(format!(
            "model '{}': cloud_api providers require a credential_ref",
            entry.model_id
        )));
    }

    if let Some(fallback) = &entry.fallback_model {
        if fallback == &entry.model_id {
            return Err(GatewayError::InvalidConfig(format!(
                "model '{}': fallback_model must not reference itself",
                entry.model_id
            )));
        }
        if !known_ids.contains(fallback.as_str()) {
            return Err(GatewayError::InvalidConfig(format!(
                "model '{}': fallback_model '{fallback}' is not defined in this configuration",
                entry.model_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmgate_core::ErrorKind;

    fn base_config(extra: &str) -> String {
        format!(
            r#"{{
                "models": [
                    {{
                        "model_id": "llama-8b",
                        "provider_family": "self_hosted",
                        "endpoint": "http://localhost:8001/v1/",
                        "max_context_tokens": 131072,
                        "max_tokens": 2048
                    }}{extra}
                ]
            }}"#
        )
    }

    #[test]
    fn parses_and_normalizes_a_valid_document() {
        let config = RegistryConfig::from_json(&base_config("")).unwrap();
        let descriptors = config.into_descriptors().unwrap();
        assert_eq!(descriptors.len(), 1);

        let d = &descriptors[0];
        assert_eq!(d.model_id, "llama-8b");
        assert_eq!(d.display_name, "llama-8b");
        assert_eq!(d.endpoint, "http://localhost:8001/v1");
        assert!(d.supports_streaming);
        assert_eq!(d.default_params.max_tokens, Some(2048));
        assert_eq!(d.timeouts, TimeoutPolicy::default());
    }

    #[test]
    fn rejects_duplicate_model_ids() {
        let raw = base_config(
            r#",
            {
                "model_id": "llama-8b",
                "provider_family": "self_hosted",
                "endpoint": "http://localhost:9001/v1",
                "max_context_tokens": 8192
            }"#,
        );
        let err = RegistryConfig::from_json(&raw)
            .unwrap()
            .into_descriptors()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_bad_endpoints() {
        for endpoint in ["not a url", "ftp://example.com/v1"] {
            let raw = format!(
                r#"{{"models": [{{
                    "model_id": "m",
                    "provider_family": "compatible_endpoint",
                    "endpoint": "{endpoint}",
                    "max_context_tokens": 4096
                }}]}}"#
            );
            let err = RegistryConfig::from_json(&raw)
                .unwrap()
                .into_descriptors()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        }
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let raw = r#"{"models": [{
            "model_id": "m",
            "provider_family": "compatible_endpoint",
            "endpoint": "https://api.example.com/v1",
            "max_context_tokens": 4096,
            "temperature": 3.5
        }]}"#;
        let err = RegistryConfig::from_json(raw)
            .unwrap()
            .into_descriptors()
            .unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn cloud_api_requires_a_credential_ref() {
        let raw = r#"{"models": [{
            "model_id": "gpt-4o",
            "provider_family": "cloud_api",
            "endpoint": "https://api.openai.com/v1",
            "max_context_tokens": 128000
        }]}"#;
        let err = RegistryConfig::from_json(raw)
            .unwrap()
            .into_descriptors()
            .unwrap_err();
        assert!(err.to_string().contains("credential_ref"));
    }

    #[test]
    fn fallback_must_exist_and_differ() {
        let missing = r#"{"models": [{
            "model_id": "fast",
            "provider_family": "self_hosted",
            "endpoint": "http://localhost:8001/v1",
            "max_context_tokens": 4096,
            "fallback_model": "slow"
        }]}"#;
        let err = RegistryConfig::from_json(missing)
            .unwrap()
            .into_descriptors()
            .unwrap_err();
        assert!(err.to_string().contains("fallback_model"));

        let self_referential = r#"{"models": [{
            "model_id": "fast",
            "provider_family": "self_hosted",
            "endpoint": "http://localhost:8001/v1",
            "max_context_tokens": 4096,
            "fallback_model": "fast"
        }]}"#;
        let err = RegistryConfig::from_json(self_referential)
            .unwrap()
            .into_descriptors()
            .unwrap_err();
        assert!(err.to_string().contains("itself"));
    }

    #[test]
    fn forward_fallback_references_are_accepted() {
        let raw = r#"{"models": [
            {
                "model_id": "fast",
                "provider_family": "self_hosted",
                "endpoint": "http://localhost:8001/v1",
                "max_context_tokens": 4096,
                "fallback_model": "fast-fallback"
            },
            {
                "model_id": "fast-fallback",
                "provider_family": "compatible_endpoint",
                "endpoint": "https://api.example.com/v1",
                "max_context_tokens": 4096
            }
        ]}"#;
        let descriptors = RegistryConfig::from_json(raw)
            .unwrap()
            .into_descriptors()
            .unwrap();
        assert_eq!(descriptors[0].fallback_model.as_deref(), Some("fast-fallback"));
    }
}
