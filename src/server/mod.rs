//! Tool server connections — the seam to external tool processes.
//!
//! A `ToolServer` yields catalog snapshots and executes invocations; a
//! `ServerConnection` binds exactly one visibility filter to one server
//! for the connection's lifetime and is the only path agents use to see
//! or call tools. Multiple agents may share a connection concurrently:
//! the filter and gate are read-only after bind time.

pub mod stdio;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::tools::{IdentityContext, ResolvedCatalog, ToolAccessGate, ToolCatalog, ToolFilter};
use crate::types::{Error, Result};

pub use stdio::{StdioServerParams, StdioToolServer};

/// External tool server collaborator.
///
/// `list_tools` may suspend and fails with a transport error on
/// connection loss; the gate propagates that unchanged and never
/// filters a failed fetch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Server name, for log and warning context.
    fn name(&self) -> &str;

    /// Fetch the current catalog snapshot.
    async fn list_tools(&self) -> Result<ToolCatalog>;

    /// Invoke a tool by name with JSON arguments.
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value>;
}

/// A tool server with a visibility filter bound at connect time.
///
/// The filter is immutable for the connection's lifetime; changing
/// policy means constructing a new connection. Each `visible_tools`
/// call re-fetches the catalog, so dynamic filters and server-side
/// catalog changes are observed per invocation window.
pub struct ServerConnection {
    server: Arc<dyn ToolServer>,
    filter: ToolFilter,
    gate: ToolAccessGate,
}

impl std::fmt::Debug for ServerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConnection")
            .field("server", &self.server.name())
            .field("filter", &self.filter)
            .finish()
    }
}

impl ServerConnection {
    pub fn bind(server: Arc<dyn ToolServer>, filter: ToolFilter, gate: ToolAccessGate) -> Self {
        Self {
            server,
            filter,
            gate,
        }
    }

    pub fn server_name(&self) -> &str {
        self.server.name()
    }

    /// The catalog visible to `context`: live fetch, then gate.
    pub async fn visible_tools(&self, context: &IdentityContext) -> Result<ResolvedCatalog> {
        let catalog = self.server.list_tools().await?;
        let resolved = self.gate.resolve(&self.filter, context, &catalog);
        for warning in &resolved.warnings {
            debug!(server = %self.server.name(), %warning, "catalog warning");
        }
        Ok(resolved)
    }

    /// Invoke a tool on behalf of `context`.
    ///
    /// A tool outside the caller's visible catalog is reported as
    /// unknown — the denied name is indistinguishable from a
    /// nonexistent one. Arguments are checked against the tool's
    /// published schema before the server is asked to run anything.
    pub async fn call_tool(
        &self,
        context: &IdentityContext,
        tool: &str,
        arguments: Value,
    ) -> Result<Value> {
        let catalog = self.server.list_tools().await?;
        let resolved = self.gate.resolve(&self.filter, context, &catalog);

        if !resolved.contains(tool) {
            return Err(Error::not_found(format!("Unknown tool: {}", tool)));
        }

        let violations = catalog.validate_args(tool, &arguments)?;
        if !violations.is_empty() {
            return Err(Error::validation(format!(
                "Invalid arguments for '{}': {}",
                tool,
                violations.join("; ")
            )));
        }

        self.server.call_tool(tool, arguments).await
    }
}

// =============================================================================
// Tests
// =============================================================================
