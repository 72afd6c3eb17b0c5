//! Tool access gate — computes the catalog an agent is allowed to see.
//!
//! Pure application of a bound filter to an immutable catalog snapshot
//! for one identity context. Safe to call repeatedly and concurrently
//! for different contexts: nothing here is mutated, so no result can
//! leak between contexts.

use std::fmt;

use tracing::{trace, warn};

use crate::tools::catalog::{ToolCatalog, ToolDescriptor};
use crate::tools::filter::{IdentityContext, ToolFilter};

/// Non-fatal problem encountered while resolving a catalog.
///
/// Warnings accompany the result instead of aborting it: a predicate
/// failure denies one tool, a malformed descriptor is excluded, and the
/// rest of the catalog is evaluated normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateWarning {
    /// Descriptor arrived without a name; excluded, never exposed.
    MalformedDescriptor { index: usize },

    /// Dynamic predicate failed for this tool; denied (fail-closed).
    PredicateFailed { tool: String, message: String },
}

impl fmt::Display for GateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDescriptor { index } => {
                write!(f, "descriptor at index {} has no name, excluded", index)
            }
            Self::PredicateFailed { tool, message } => {
                write!(f, "filter predicate failed for '{}': {}", tool, message)
            }
        }
    }
}

/// The subset of a catalog passing the bound filter for one context.
///
/// Always a subsequence of the source catalog: names are unique and the
/// source's relative ordering is preserved.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCatalog {
    pub tools: Vec<ToolDescriptor>,
    pub warnings: Vec<GateWarning>,
}

impl ResolvedCatalog {
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Applies a bound filter to a catalog, producing the visible view.
///
/// Holds no mutable state; the decision-trace toggle comes in from
/// runtime configuration rather than a process-wide global.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolAccessGate {
    trace_decisions: bool,
}

impl ToolAccessGate {
    pub fn new(trace_decisions: bool) -> Self {
        Self { trace_decisions }
    }

    /// Resolve the visible catalog for one `(filter, context, catalog)`.
    ///
    /// Evaluates the filter against every descriptor in catalog order.
    /// An empty catalog resolves to an empty result. Malformed
    /// descriptors and predicate failures are excluded with a warning;
    /// neither aborts the batch. Each predicate failure is additionally
    /// logged once, with the tool and agent for context.
    pub fn resolve(
        &self,
        filter: &ToolFilter,
        context: &IdentityContext,
        catalog: &ToolCatalog,
    ) -> ResolvedCatalog {
        let mut resolved = ResolvedCatalog::default();

        for (index, descriptor) in catalog.iter().enumerate() {
            if descriptor.is_malformed() {
                warn!(index, "tool descriptor has no name, excluding from catalog");
                resolved
                    .warnings
                    .push(GateWarning::MalformedDescriptor { index });
                continue;
            }

            match filter.evaluate(context, descriptor) {
                Ok(true) => {
                    if self.trace_decisions {
                        trace!(
                            tool = %descriptor.name,
                            agent = %context.agent_name,
                            "tool allowed"
                        );
                    }
                    resolved.tools.push(descriptor.clone());
                }
                Ok(false) => {
                    if self.trace_decisions {
                        trace!(
                            tool = %descriptor.name,
                            agent = %context.agent_name,
                            "tool denied"
                        );
                    }
                }
                Err(message) => {
                    // Fail-closed: a failing predicate denies this one tool.
                    warn!(
                        tool = %descriptor.name,
                        agent = %context.agent_name,
                        %message,
                        "tool filter predicate failed, denying tool"
                    );
                    resolved.warnings.push(GateWarning::PredicateFailed {
                        tool: descriptor.name.clone(),
                        message,
                    });
                }
            }
        }

        resolved
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::ToolCatalog;

    fn filesystem_catalog() -> ToolCatalog {
        ToolCatalog::from_descriptors(vec![
            ToolDescriptor::new("read_file", "Read a file"),
            ToolDescriptor::new("list_directory", "List entries"),
            ToolDescriptor::new("write_file", "Write a file"),
            ToolDescriptor::new("delete_file", "Delete a file"),
        ])
        .unwrap()
    }

    fn context() -> IdentityContext {
        IdentityContext::new("Assistant")
    }

    #[test]
    fn test_block_list_scenario() {
        let gate = ToolAccessGate::default();
        let filter = ToolFilter::blocking(["delete_file"]);

        let resolved = gate.resolve(&filter, &context(), &filesystem_catalog());
        assert_eq!(
            resolved.names(),
            vec!["read_file", "list_directory", "write_file"]
        );
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_prefix_predicate_scenario() {
        let gate = ToolAccessGate::default();
        let filter = ToolFilter::dynamic(|_, t| {
            Ok(t.name.starts_with("read_") || t.name.starts_with("list_"))
        });

        let resolved = gate.resolve(&filter, &context(), &filesystem_catalog());
        assert_eq!(resolved.names(), vec!["read_file", "list_directory"]);
    }

    #[test]
    fn test_allow_list_preserves_order() {
        let gate = ToolAccessGate::default();
        // Allow-list in scrambled order; result follows catalog order.
        let filter = ToolFilter::allowing(["write_file", "read_file"]);

        let resolved = gate.resolve(&filter, &context(), &filesystem_catalog());
        assert_eq!(resolved.names(), vec!["read_file", "write_file"]);
    }

    #[test]
    fn test_allow_all_is_identity() {
        let gate = ToolAccessGate::default();
        let catalog = filesystem_catalog();

        let resolved = gate.resolve(&ToolFilter::allow_all(), &context(), &catalog);
        assert_eq!(resolved.names(), catalog.names());
    }

    #[test]
    fn test_empty_catalog_is_empty_result() {
        let gate = ToolAccessGate::default();
        let resolved = gate.resolve(&ToolFilter::allow_all(), &context(), &ToolCatalog::new());
        assert!(resolved.is_empty());
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_always_false_predicate_empties_catalog() {
        let gate = ToolAccessGate::default();
        let filter = ToolFilter::dynamic(|_, _| Ok(false));
        let resolved = gate.resolve(&filter, &context(), &filesystem_catalog());
        assert!(resolved.is_empty());
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let gate = ToolAccessGate::default();
        let filter = ToolFilter::blocking(["delete_file"]);
        let catalog = filesystem_catalog();
        let ctx = context();

        let first = gate.resolve(&filter, &ctx, &catalog);
        let second = gate.resolve(&filter, &ctx, &catalog);
        assert_eq!(first.names(), second.names());
        assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn test_predicate_failure_denies_one_tool_only() {
        let gate = ToolAccessGate::default();
        let filter = ToolFilter::dynamic(|_, t| {
            if t.name == "write_file" {
                Err("backing store unavailable".to_string())
            } else {
                Ok(true)
            }
        });

        let resolved = gate.resolve(&filter, &context(), &filesystem_catalog());
        assert_eq!(
            resolved.names(),
            vec!["read_file", "list_directory", "delete_file"]
        );
        assert_eq!(
            resolved.warnings,
            vec![GateWarning::PredicateFailed {
                tool: "write_file".to_string(),
                message: "backing store unavailable".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_descriptor_excluded_with_warning() {
        let gate = ToolAccessGate::default();
        let catalog = ToolCatalog::from_descriptors(vec![
            ToolDescriptor::new("read_file", "Read"),
            ToolDescriptor::new("", "nameless"),
            ToolDescriptor::new("write_file", "Write"),
        ])
        .unwrap();

        let resolved = gate.resolve(&ToolFilter::allow_all(), &context(), &catalog);
        assert_eq!(resolved.names(), vec!["read_file", "write_file"]);
        assert_eq!(
            resolved.warnings,
            vec![GateWarning::MalformedDescriptor { index: 1 }]
        );
    }

    #[test]
    fn test_distinct_contexts_do_not_leak() {
        let gate = ToolAccessGate::default();
        let filter = ToolFilter::dynamic(|ctx, t| {
            Ok(ctx.agent_name == "AdminAgent" || t.name.starts_with("read_"))
        });
        let catalog = filesystem_catalog();

        let admin = gate.resolve(&filter, &IdentityContext::new("AdminAgent"), &catalog);
        let readonly = gate.resolve(&filter, &IdentityContext::new("ReadOnlyAgent"), &catalog);

        assert_eq!(admin.len(), 4);
        assert_eq!(readonly.names(), vec!["read_file"]);

        // Re-resolving the first context after the second yields the same view.
        let admin_again = gate.resolve(&filter, &IdentityContext::new("AdminAgent"), &catalog);
        assert_eq!(admin.names(), admin_again.names());
    }
}

// =============================================================================
// Property tests
// =============================================================================
