//! # Warden Core - Tool Access Control & Model Routing
//!
//! Policy layer for multi-agent runtimes providing:
//! - Per-agent tool visibility: static allow/block lists and dynamic
//!   predicates applied to a tool server's catalog
//! - Role bindings: role identifier → filter, selected once per agent
//! - Model endpoint resolution: requested model name → credentialed
//!   backend descriptor, with a configured default
//! - Scoped stdio tool-server connections with guaranteed shutdown
//!
//! ## Architecture
//!
//! ```text
//!   identity context ──┐
//!                      ▼
//!   ToolServer ──► ToolCatalog ──► ToolAccessGate ──► ResolvedCatalog ──► agent runtime
//!                                       ▲
//!                                  ToolFilter (bound per connection)
//!
//!   requested model ──► ModelProviderResolver ──► ModelEndpointDescriptor ──► ModelClient
//! ```
//!
//! Filtering and endpoint resolution are synchronous, pure computations
//! on already-fetched data; only the collaborators (tool server, model
//! backend) suspend.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod model;
pub mod server;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
