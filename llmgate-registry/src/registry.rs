//! The reloadable model registry.
//!
//! Lookups go through an immutable snapshot table behind an `Arc`; `reload`
//! swaps the whole table atomically. Readers that grabbed a snapshot before
//! the swap keep resolving against it, so an in-flight request never observes
//! a half-updated registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use llmgate_core::GatewayError;

use crate::config::RegistryConfig;
use crate::descriptor::ModelDescriptor;

/// One immutable, internally consistent view of the registry.
#[derive(Debug)]
pub struct RegistrySnapshot {
    entries: Vec<Arc<ModelDescriptor>>,
    index: HashMap<String, usize>,
}

impl RegistrySnapshot {
    fn build(descriptors: Vec<ModelDescriptor>) -> Result<Self, GatewayError> {
        let mut entries = Vec::with_capacity(descriptors.len());
        let mut index = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if index
                .insert(descriptor.model_id.clone(), entries.len())
                .is_some()
            {
                return Err(GatewayError::InvalidConfig(format!(
                    "duplicate model_id '{}'",
                    descriptor.model_id
                )));
            }
            entries.push(Arc::new(descriptor));
        }
        Ok(Self { entries, index })
    }

    /// Resolve a model identifier within this snapshot.
    pub fn resolve(&self, model_id: &str) -> Result<Arc<ModelDescriptor>, GatewayError> {
        self.index
            .get(model_id)
            .map(|&i| self.entries[i].clone())
            .ok_or_else(|| GatewayError::UnknownModel(model_id.to_string()))
    }

    /// All descriptors in configuration insertion order.
    pub fn list(&self) -> &[Arc<ModelDescriptor>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-scoped registry handle.
///
/// Passed by `Arc` to routing and the adapter factory; `reload` is the only
/// mutation path.
#[derive(Debug)]
pub struct ModelRegistry {
    table: RwLock<Arc<RegistrySnapshot>>,
}

impl ModelRegistry {
    pub fn new(descriptors: Vec<ModelDescriptor>) -> Result<Self, GatewayError> {
        Ok(Self {
            table: RwLock::new(Arc::new(RegistrySnapshot::build(descriptors)?)),
        })
    }

    /// Build a registry straight from a parsed configuration document.
    pub fn from_config(config: RegistryConfig) -> Result<Self, GatewayError> {
        Self::new(config.into_descriptors()?)
    }

    /// Resolve against the current table.
    pub fn resolve(&self, model_id: &str) -> Result<Arc<ModelDescriptor>, GatewayError> {
        self.snapshot().resolve(model_id)
    }

    /// All current descriptors in insertion order.
    pub fn list(&self) -> Vec<Arc<ModelDescriptor>> {
        self.snapshot().list().to_vec()
    }

    /// A consistent view of the current table. Holders keep resolving
    /// against it even across a concurrent `reload`.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replace the whole table. No partial updates: the new
    /// entries are validated as a unit before the swap.
    pub fn reload(&self, descriptors: Vec<ModelDescriptor>) -> Result<(), GatewayError> {
        let next = Arc::new(RegistrySnapshot::build(descriptors)?);
        let count = next.len();
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = next;
        info!(models = count, "registry reloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DefaultParams, TimeoutPolicy};
    use llmgate_core::ErrorKind;
    use llmgate_core::types::ProviderFamily;

    fn descriptor(model_id: &str, max_context_tokens: u32) -> ModelDescriptor {
        ModelDescriptor {
            model_id: model_id.to_string(),
            display_name: model_id.to_string(),
            provider_family: ProviderFamily::SelfHosted,
            endpoint: "http://localhost:8001/v1".to_string(),
            credential_ref: None,
            supports_streaming: true,
            max_context_tokens,
            default_params: DefaultParams::default(),
            timeouts: TimeoutPolicy::default(),
            fallback_model: None,
        }
    }

    #[test]
    fn resolve_returns_the_latest_descriptor_for_a_key() {
        let registry = ModelRegistry::new(vec![descriptor("m", 4096)]).unwrap();
        assert_eq!(registry.resolve("m").unwrap().max_context_tokens, 4096);

        registry.reload(vec![descriptor("m", 8192)]).unwrap();
        assert_eq!(registry.resolve("m").unwrap().max_context_tokens, 8192);
    }

    #[test]
    fn unknown_model_resolution_fails() {
        let registry = ModelRegistry::new(vec![descriptor("m", 4096)]).unwrap();
        let err = registry.resolve("absent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownModel);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let registry = ModelRegistry::new(vec![
            descriptor("c", 1),
            descriptor("a", 2),
            descriptor("b", 3),
        ])
        .unwrap();
        let ids: Vec<_> = registry
            .list()
            .iter()
            .map(|d| d.model_id.clone())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn snapshots_are_isolated_from_reload() {
        let registry = ModelRegistry::new(vec![descriptor("m", 4096)]).unwrap();
        let before = registry.snapshot();

        registry
            .reload(vec![descriptor("m", 8192), descriptor("n", 1024)])
            .unwrap();

        // The pre-swap snapshot still serves the old view.
        assert_eq!(before.resolve("m").unwrap().max_context_tokens, 4096);
        assert!(before.resolve("n").is_err());

        // New lookups see the new table.
        assert_eq!(registry.resolve("m").unwrap().max_context_tokens, 8192);
        assert!(registry.resolve("n").is_ok());
    }

    #[test]
    fn reload_rejects_duplicates_without_touching_the_table() {
        let registry = ModelRegistry::new(vec![descriptor("m", 4096)]).unwrap();
        let err = registry
            .reload(vec![descriptor("x", 1), descriptor("x", 2)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        // Failed reload leaves the previous table in place.
        assert!(registry.resolve("m").is_ok());
    }
}
