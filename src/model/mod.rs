//! Model routing — endpoint resolution and the completion client.

pub mod client;
pub mod provider;

pub use client::{ChatMessage, ModelClient};
pub use provider::{ModelEndpointDescriptor, ModelProviderResolver};
