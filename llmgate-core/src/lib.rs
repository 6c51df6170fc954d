//! llmgate-core
//!
//! Canonical chat-completion types, the gateway error taxonomy, and shared
//! streaming primitives. Everything provider-specific lives in the provider
//! crates; everything here is the one shape the rest of the workspace speaks.
#![deny(unsafe_code)]

pub mod error;
pub mod streaming;
pub mod types;

pub use error::{ErrorKind, GatewayError, RejectionKind};
