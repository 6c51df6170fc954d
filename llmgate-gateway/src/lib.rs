//! llmgate-gateway
//!
//! The runtime half of the gateway core: the adapter factory (construction,
//! caching, health checks) and the dispatcher that resolves a request's model
//! identifier, invokes the adapter, and applies the one-hop fallback policy.
#![deny(unsafe_code)]

mod dispatch;
mod factory;
mod listing;

pub use dispatch::{Dispatched, Dispatcher, Reply};
pub use factory::{AdapterFactory, FactoryConfig};
pub use listing::ModelInfo;
