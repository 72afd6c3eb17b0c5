//! Core types for the warden.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the model backend,
//!   observability, and tool server transport

mod config;
mod errors;

pub use config::{Config, ModelConfig, ObservabilityConfig, ServerConfig};
pub use errors::{Error, Result};
