//! llmgate
//!
//! One OpenAI-style chat-completion surface over interchangeable model
//! providers. This facade crate re-exports the workspace so applications can
//! depend on a single crate:
//!
//! - [`types`] / [`streaming`] / [`error`]: the canonical data model
//! - registry types: declarative model configuration and resolution
//! - [`ProviderAdapter`]: the OpenAI-compatible adapter family
//! - [`AdapterFactory`] / [`Dispatcher`]: construction, health, and routing
//!
//! ```rust,ignore
//! use llmgate::prelude::*;
//!
//! let registry = Arc::new(ModelRegistry::from_config(
//!     RegistryConfig::from_json(&std::fs::read_to_string("models.json")?)?,
//! )?);
//! let factory = Arc::new(AdapterFactory::new(
//!     registry.clone(),
//!     Arc::new(EnvCredentialStore),
//!     FactoryConfig::default(),
//! ));
//! factory.spawn_health_loop();
//!
//! let dispatcher = Dispatcher::new(registry, factory);
//! let dispatched = dispatcher
//!     .dispatch(ChatRequest::new("fast", vec![ChatMessage::user("hi")]))
//!     .await?;
//! ```
#![deny(unsafe_code)]

pub use llmgate_core::{error, streaming, types};
pub use llmgate_core::{ErrorKind, GatewayError, RejectionKind};

pub use llmgate_registry::{
    CredentialStore, DefaultParams, EnvCredentialStore, ModelDescriptor, ModelEntry,
    ModelRegistry, ProviderKey, RegistryConfig, RegistrySnapshot, StaticCredentialStore,
    TimeoutPolicy,
};

pub use llmgate_provider_openai_compatible::{
    AdapterConfig, OpenAiCompatibleAdapter, ProviderAdapter,
};

pub use llmgate_gateway::{
    AdapterFactory, Dispatched, Dispatcher, FactoryConfig, ModelInfo, Reply,
};

/// The common imports for applications embedding the gateway core.
pub mod prelude {
    pub use std::sync::Arc;

    pub use llmgate_core::streaming::{ChatChunk, ChunkStream, ChunkStreamHandle};
    pub use llmgate_core::types::{
        ChatMessage, ChatRequest, ChatResponse, FinishReason, HealthStatus, MessageRole,
        ProviderFamily, Usage,
    };
    pub use llmgate_core::{ErrorKind, GatewayError, RejectionKind};
    pub use llmgate_gateway::{AdapterFactory, Dispatched, Dispatcher, FactoryConfig, Reply};
    pub use llmgate_registry::{
        CredentialStore, EnvCredentialStore, ModelRegistry, RegistryConfig,
        StaticCredentialStore,
    };
}
