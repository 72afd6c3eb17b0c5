//! Configuration structures.
//!
//! Configuration is loaded from environment variables and config files.
//! The model backend surface (`MODEL_API_KEY`, `MODEL_BASE_URL`,
//! `MODEL_NAME`) feeds the provider resolver; a base URL without a
//! credential is rejected up front rather than at first request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{Error, Result};

/// Global warden configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model backend configuration.
    #[serde(default)]
    pub model: ModelConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Tool server transport limits.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// Absent `MODEL_NAME` falls back to the default model id. Absent
    /// `MODEL_API_KEY` is allowed here — the resolver rejects it at
    /// resolve time — unless a `MODEL_BASE_URL` is present, in which
    /// case the combination is reported immediately as a configuration
    /// error (a custom backend can never be called unauthenticated).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MODEL_API_KEY").ok().filter(|v| !v.is_empty());
        let base_url = std::env::var("MODEL_BASE_URL").ok().filter(|v| !v.is_empty());
        let default_model = std::env::var("MODEL_NAME")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| ModelConfig::default().default_model);

        if base_url.is_some() && api_key.is_none() {
            return Err(Error::configuration(
                "MODEL_BASE_URL is set but MODEL_API_KEY is not",
            ));
        }

        Ok(Self {
            model: ModelConfig {
                api_key,
                base_url,
                default_model,
            },
            observability: ObservabilityConfig::default(),
            server: ServerConfig::default(),
        })
    }
}

/// Model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API credential for the backend. Never logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Backend base URL. `None` means the collaborator's built-in default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model id used when a request does not name one.
    pub default_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_model: "gpt-4o".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,

    /// Emit trace-level diagnostics for filter decisions. Explicit field
    /// rather than a process-wide toggle so two runtimes in one process
    /// can disagree.
    pub trace_decisions: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            trace_decisions: false,
        }
    }
}

/// Tool server transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Timeout for a single request to a tool server. Requests idle
    /// beyond this duration fail with a transport error.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Grace period between shutdown request and SIGKILL of the server
    /// subprocess.
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,

    /// Maximum accepted size of a single response line from the server.
    pub max_response_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(2),
            max_response_bytes: 5 * 1024 * 1024,
        }
    }
}
