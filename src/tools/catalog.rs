//! Tool catalog — an ordered snapshot of what a tool server exposes.
//!
//! Descriptors are immutable once fetched; identity is the tool name.
//! The catalog preserves the server's listing order so a filtered view
//! is always a stable subsequence of the original listing.

use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::types::{Error, Result};

/// A single capability exposed by a tool server.
///
/// Fetched from the server's listing endpoint; never mutated afterwards.
/// A descriptor that arrived without a name deserializes with an empty
/// `name` and is treated as malformed by the access gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// JSON Schema for the tool's arguments, as published by the server.
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: Value::Null,
        }
    }

    /// A descriptor without a usable name cannot be addressed and must
    /// never be exposed to an agent.
    pub fn is_malformed(&self) -> bool {
        self.name.is_empty()
    }
}

/// Ordered, immutable snapshot of a server's tool listing.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Build a catalog from descriptors in server order.
    ///
    /// Duplicate names are rejected: two tools with the same name cannot
    /// be told apart at invocation time. Malformed (nameless) entries are
    /// kept — the gate excludes them with a warning so they are never
    /// silently dropped.
    pub fn from_descriptors(descriptors: Vec<ToolDescriptor>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for descriptor in &descriptors {
            if descriptor.is_malformed() {
                continue;
            }
            if !seen.insert(descriptor.name.as_str()) {
                return Err(Error::validation(format!(
                    "Duplicate tool name in catalog: {}",
                    descriptor.name
                )));
            }
        }
        Ok(Self { descriptors })
    }

    /// Parse a catalog from the raw listing payload (array of tool objects).
    pub fn from_wire(tools: &Value) -> Result<Self> {
        let entries = tools
            .as_array()
            .ok_or_else(|| Error::validation("Tool listing must be a JSON array"))?;

        let descriptors = entries
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()))
            .collect::<std::result::Result<Vec<ToolDescriptor>, _>>()?;

        Self::from_descriptors(descriptors)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Descriptors in server order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.descriptors.iter()
    }

    /// Tool names in server order (malformed entries excluded).
    pub fn names(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .filter(|d| !d.is_malformed())
            .map(|d| d.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validate arguments against a tool's published input schema.
    ///
    /// Returns the list of violations (empty = valid). A tool without a
    /// schema accepts anything.
    pub fn validate_args(&self, name: &str, args: &Value) -> Result<Vec<String>> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", name)))?;

        if descriptor.input_schema.is_null() {
            return Ok(Vec::new());
        }

        let validator = Validator::new(&descriptor.input_schema).map_err(|e| {
            Error::validation(format!("Invalid input schema for '{}': {}", name, e))
        })?;

        Ok(validator
            .iter_errors(args)
            .map(|e| e.to_string())
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
