//! Role table — role identifier → bound tool filter.
//!
//! Replaces branch-on-agent-name predicates with a lookup table selected
//! once when the agent is constructed. Adding a role is a data change,
//! not a code change. An unknown role resolves to deny-all: a
//! misconfigured agent sees zero tools, never all of them.

use std::collections::HashMap;

use crate::tools::filter::ToolFilter;

/// Lookup table mapping role identifiers to their bound filters.
#[derive(Debug)]
pub struct RoleTable {
    filters: HashMap<String, ToolFilter>,
    deny_all: ToolFilter,
}

impl RoleTable {
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
            deny_all: ToolFilter::deny_all(),
        }
    }

    /// Bind a filter to a role, replacing any previous binding.
    pub fn bind(&mut self, role: impl Into<String>, filter: ToolFilter) {
        self.filters.insert(role.into(), filter);
    }

    /// The filter bound to `role`, or deny-all if the role is unknown.
    pub fn filter_for(&self, role: &str) -> &ToolFilter {
        self.filters.get(role).unwrap_or(&self.deny_all)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.filters.contains_key(role)
    }

    /// Bound role identifiers, sorted.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The three roles from the reference deployment, as a starting table.
///
/// `read_only` sees `read_`/`list_` prefixed tools, `admin` sees
/// everything, `basic` sees exactly `read_file` and `list_directory`.
pub fn standard_roles() -> RoleTable {
    let mut table = RoleTable::new();
    table.bind(
        "read_only",
        ToolFilter::dynamic(|_, t| {
            Ok(t.name.starts_with("read_") || t.name.starts_with("list_"))
        }),
    );
    table.bind("admin", ToolFilter::allow_all());
    table.bind("basic", ToolFilter::allowing(["read_file", "list_directory"]));
    table
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{ToolCatalog, ToolDescriptor};
    use crate::tools::filter::IdentityContext;
    use crate::tools::gate::ToolAccessGate;

    fn filesystem_catalog() -> ToolCatalog {
        ToolCatalog::from_descriptors(vec![
            ToolDescriptor::new("read_file", ""),
            ToolDescriptor::new("list_directory", ""),
            ToolDescriptor::new("write_file", ""),
            ToolDescriptor::new("delete_file", ""),
        ])
        .unwrap()
    }

    fn resolve_for(table: &RoleTable, role: &str) -> Vec<String> {
        let gate = ToolAccessGate::default();
        let context = IdentityContext::new(role);
        gate.resolve(table.filter_for(role), &context, &filesystem_catalog())
            .names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_standard_roles() {
        let table = standard_roles();
        assert_eq!(table.roles(), vec!["admin", "basic", "read_only"]);

        assert_eq!(
            resolve_for(&table, "read_only"),
            vec!["read_file", "list_directory"]
        );
        assert_eq!(
            resolve_for(&table, "admin"),
            vec!["read_file", "list_directory", "write_file", "delete_file"]
        );
        assert_eq!(
            resolve_for(&table, "basic"),
            vec!["read_file", "list_directory"]
        );
    }

    #[test]
    fn test_unknown_role_denies_everything() {
        let table = standard_roles();
        assert!(!table.has_role("intruder"));
        assert!(resolve_for(&table, "intruder").is_empty());
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut table = RoleTable::new();
        table.bind("basic", ToolFilter::allow_all());
        table.bind("basic", ToolFilter::deny_all());
        assert_eq!(table.len(), 1);
        assert!(resolve_for(&table, "basic").is_empty());
    }
}
