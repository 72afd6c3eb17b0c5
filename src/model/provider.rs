//! Model provider resolution — requested model name → concrete endpoint.
//!
//! One configured backend plus a per-request model-name override. The
//! resolver is built once from configuration and immutable thereafter;
//! re-configuration means constructing a new resolver, never mutating a
//! live one while requests may be in flight.

use std::fmt;

use crate::types::{Error, ModelConfig, Result};

/// Credential + address + model id needed to reach an LLM backend.
///
/// `base_url` of `None` means the collaborator's built-in default
/// transport. The credential is redacted from debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ModelEndpointDescriptor {
    pub credential: String,
    pub base_url: Option<String>,
    pub model: String,
}

impl fmt::Debug for ModelEndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEndpointDescriptor")
            .field("credential", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Maps a requested model name (or none) to an endpoint descriptor.
#[derive(Debug, Clone)]
pub struct ModelProviderResolver {
    api_key: Option<String>,
    base_url: Option<String>,
    default_model: String,
}

impl ModelProviderResolver {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            default_model: config.default_model.clone(),
        }
    }

    /// Resolve an endpoint for `requested`, falling back to the
    /// configured default model id when the caller does not specify one.
    ///
    /// Fails with `MissingCredential` before any network attempt if no
    /// credential is configured — the caller must never fall through to
    /// an implicit unauthenticated call against some other provider.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ModelEndpointDescriptor> {
        let credential = self.api_key.clone().ok_or_else(|| {
            Error::missing_credential("no model API key configured (MODEL_API_KEY)")
        })?;

        let model = requested
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.default_model)
            .to_string();

        Ok(ModelEndpointDescriptor {
            credential,
            base_url: self.base_url.clone(),
            model,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
