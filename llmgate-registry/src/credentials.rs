//! Credential resolution seam.
//!
//! Credentials are resolved only at adapter construction time and live inside
//! [`SecretString`] so they never show up in `Debug` output or logs.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::SecretString;

use llmgate_core::GatewayError;

/// Resolves an opaque credential reference to a secret value.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with [`GatewayError::CredentialUnavailable`] when the reference
    /// cannot be resolved.
    async fn get_credential(&self, credential_ref: &str) -> Result<SecretString, GatewayError>;
}

/// Reads credentials from process environment variables; the credential
/// reference is the variable name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialStore;

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn get_credential(&self, credential_ref: &str) -> Result<SecretString, GatewayError> {
        std::env::var(credential_ref)
            .map(SecretString::from)
            .map_err(|_| {
                GatewayError::CredentialUnavailable(format!(
                    "environment variable '{credential_ref}' is not set"
                ))
            })
    }
}

/// Fixed in-memory credential set, mainly for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    secrets: HashMap<String, SecretString>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(
        mut self,
        credential_ref: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.secrets
            .insert(credential_ref.into(), SecretString::from(secret.into()));
        self
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn get_credential(&self, credential_ref: &str) -> Result<SecretString, GatewayError> {
        self.secrets.get(credential_ref).cloned().ok_or_else(|| {
            GatewayError::CredentialUnavailable(format!("no credential for '{credential_ref}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmgate_core::ErrorKind;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn static_store_resolves_known_refs() {
        let store = StaticCredentialStore::new().with_credential("api-key", "sk-test");
        let secret = store.get_credential("api-key").await.unwrap();
        assert_eq!(secret.expose_secret(), "sk-test");

        let err = store.get_credential("other").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialUnavailable);
    }

    #[tokio::test]
    async fn env_store_misses_report_credential_unavailable() {
        let err = EnvCredentialStore
            .get_credential("LLMGATE_TEST_SURELY_UNSET_VAR")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialUnavailable);
    }

    #[test]
    fn secrets_do_not_leak_through_debug() {
        let store = StaticCredentialStore::new().with_credential("api-key", "sk-secret-value");
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("sk-secret-value"));
    }
}
