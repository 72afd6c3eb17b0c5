//! Tool filters — per-connection visibility rules.
//!
//! Exactly one filter is bound per tool-server connection at setup time
//! and is immutable for the connection's lifetime. The static/dynamic
//! split is a closed set of two cases, so every evaluation site match
//! stays exhaustive.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::tools::catalog::ToolDescriptor;
use crate::types::{Error, Result};

/// Caller-identifying data available to a filter decision.
///
/// Created fresh per agent instantiation; read-only to filters. The
/// `extensions` map carries runtime-specific fields a dynamic predicate
/// may consult (session tags, tenant ids).
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityContext {
    pub agent_name: String,
    pub extensions: BTreeMap<String, Value>,
}

impl IdentityContext {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}

/// Fallible predicate over `(context, descriptor)`.
///
/// An `Err` is a deny for that one tool (fail-closed) and is reported as
/// a non-fatal warning; it never aborts evaluation of remaining tools.
/// Predicates must not depend on global state beyond the supplied
/// context — a design requirement for testability, not a runtime check.
pub type DynamicPredicate =
    Arc<dyn Fn(&IdentityContext, &ToolDescriptor) -> std::result::Result<bool, String> + Send + Sync>;

/// Visibility rule bound to one tool-server connection.
#[derive(Clone)]
pub enum ToolFilter {
    /// Name-set rule. Mutually exclusive allow/block configuration,
    /// validated at construction.
    Static(StaticFilter),

    /// Arbitrary predicate over the request-scoped context.
    Dynamic(DynamicPredicate),
}

/// Allow-list / block-list rule over tool names.
///
/// Well-formed states: allow-list only, block-list only, or neither
/// (allow all). Both set is ambiguous and rejected at bind time.
#[derive(Debug, Clone, Default)]
pub struct StaticFilter {
    allowed: Option<HashSet<String>>,
    blocked: Option<HashSet<String>>,
}

impl StaticFilter {
    fn passes(&self, name: &str) -> bool {
        match (&self.allowed, &self.blocked) {
            (Some(allowed), None) => allowed.contains(name),
            (None, Some(blocked)) => !blocked.contains(name),
            (None, None) => true,
            // Unreachable by construction; deny if it ever happens.
            (Some(_), Some(_)) => false,
        }
    }
}

impl ToolFilter {
    /// Default-allow rule: every tool passes.
    pub fn allow_all() -> Self {
        Self::Static(StaticFilter::default())
    }

    /// Deny-all rule (empty allow-list).
    pub fn deny_all() -> Self {
        Self::Static(StaticFilter {
            allowed: Some(HashSet::new()),
            blocked: None,
        })
    }

    /// Allow-list rule: a tool passes iff its name is in `names`.
    pub fn allowing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Static(StaticFilter {
            allowed: Some(names.into_iter().map(Into::into).collect()),
            blocked: None,
        })
    }

    /// Block-list rule: a tool passes iff its name is not in `names`.
    pub fn blocking<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Static(StaticFilter {
            allowed: None,
            blocked: Some(names.into_iter().map(Into::into).collect()),
        })
    }

    /// Build a static rule from optional allow and block lists.
    ///
    /// Rejects the ambiguous both-set configuration at bind time so no
    /// precedence question can arise later.
    pub fn static_rule(
        allowed: Option<HashSet<String>>,
        blocked: Option<HashSet<String>>,
    ) -> Result<Self> {
        if allowed.is_some() && blocked.is_some() {
            return Err(Error::configuration(
                "Static tool filter cannot set both an allow-list and a block-list",
            ));
        }
        Ok(Self::Static(StaticFilter { allowed, blocked }))
    }

    /// Dynamic rule from a fallible predicate.
    pub fn dynamic<F>(predicate: F) -> Self
    where
        F: Fn(&IdentityContext, &ToolDescriptor) -> std::result::Result<bool, String>
            + Send
            + Sync
            + 'static,
    {
        Self::Dynamic(Arc::new(predicate))
    }

    /// Evaluate this rule for one `(context, descriptor)` pair.
    ///
    /// Deterministic and side-effect free. Static rules never fail;
    /// a dynamic `Err` carries the predicate's failure message.
    pub fn evaluate(
        &self,
        context: &IdentityContext,
        descriptor: &ToolDescriptor,
    ) -> std::result::Result<bool, String> {
        match self {
            Self::Static(rule) => Ok(rule.passes(&descriptor.name)),
            Self::Dynamic(predicate) => predicate(context, descriptor),
        }
    }
}

impl fmt::Debug for ToolFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(rule) => f.debug_tuple("Static").field(rule).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(<predicate>)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
