//! Chat completion client for a resolved model endpoint.
//!
//! One POST per completion against an OpenAI-compatible chat API.
//! Retry/backoff belongs to the collaborator API, not here.

use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::provider::ModelEndpointDescriptor;
use crate::types::{Error, Result};

/// Default backend when the endpoint carries no base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// One message in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat client keyed by a resolved endpoint descriptor.
#[derive(Debug)]
pub struct ModelClient {
    http: HttpClient,
    endpoint: ModelEndpointDescriptor,
    temperature: Option<f64>,
}

impl ModelClient {
    pub fn new(endpoint: ModelEndpointDescriptor) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            temperature: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.endpoint.model
    }

    /// Run one completion and return the assistant's text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let base = self
            .endpoint
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let url = format!("{}/chat/completions", base);

        let body = CompletionRequest {
            model: &self.endpoint.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.endpoint.credential)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let parsed: CompletionResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::backend(format!("malformed completion response: {}", e)))?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| Error::backend("completion response had no content"))
            }
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(Error::backend(format!(
                    "completion failed with {}: {}",
                    status, detail
                )))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
