//! llmgate-provider-openai-compatible
//!
//! One adapter implementation covers every provider family in the gateway:
//! the cloud API, self-hosted inference servers, and other OpenAI-compatible
//! endpoints all share the chat-completion wire shape, so the adapter is
//! parameterized by endpoint and credential instead of being subclassed per
//! deployment target. Family-specific behavior is confined to construction.
#![deny(unsafe_code)]

mod classify;
mod client;
mod config;
mod family;
mod sse;
mod wire;

pub use classify::{classify_status, classify_transport};
pub use client::OpenAiCompatibleAdapter;
pub use config::AdapterConfig;
pub use family::ProviderAdapter;
