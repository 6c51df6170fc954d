//! llmgate-registry
//!
//! The declarative model registry: immutable [`ModelDescriptor`]s built from
//! validated configuration, an atomically reloadable lookup table, and the
//! credential-store seam used at adapter construction time.
#![deny(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod descriptor;
pub mod registry;

pub use config::{ModelEntry, RegistryConfig};
pub use credentials::{CredentialStore, EnvCredentialStore, StaticCredentialStore};
pub use descriptor::{DefaultParams, ModelDescriptor, ProviderKey, TimeoutPolicy};
pub use registry::{ModelRegistry, RegistrySnapshot};
