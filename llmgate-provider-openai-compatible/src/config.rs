//! Adapter construction parameters.

use std::time::Duration;

use secrecy::SecretString;

use llmgate_core::types::ProviderFamily;
use llmgate_registry::{ModelDescriptor, TimeoutPolicy};

/// Everything needed to build one OpenAI-compatible adapter.
#[derive(Clone)]
pub struct AdapterConfig {
    pub provider_family: ProviderFamily,
    /// Base URL of the provider API (no trailing slash).
    pub base_url: String,
    /// Resolved credential, if the configuration references one.
    pub api_key: Option<SecretString>,
    pub connect_timeout: Duration,
}

impl AdapterConfig {
    pub fn from_descriptor(descriptor: &ModelDescriptor, api_key: Option<SecretString>) -> Self {
        Self {
            provider_family: descriptor.provider_family,
            base_url: descriptor.endpoint.clone(),
            api_key,
            connect_timeout: descriptor.timeouts.connect,
        }
    }

    pub fn new(provider_family: ProviderFamily, base_url: impl Into<String>) -> Self {
        Self {
            provider_family,
            base_url: base_url.into(),
            api_key: None,
            connect_timeout: TimeoutPolicy::default().connect,
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

impl std::fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("AdapterConfig");
        ds.field("provider_family", &self.provider_family)
            .field("base_url", &self.base_url)
            .field("connect_timeout", &self.connect_timeout);
        if self.api_key.is_some() {
            ds.field("has_api_key", &true);
        }
        ds.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_key() {
        let config = AdapterConfig::new(ProviderFamily::CloudApi, "https://api.example.com/v1")
            .with_api_key(SecretString::from("sk-very-secret".to_string()));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("has_api_key"));
    }
}
