//! HTTP client for the remote completion endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::info;
use url::Url;

use super::types::{CompletionRequest, CompletionResponse};
use crate::util::text::preview;
use crate::Config;

/// Reasons a completion call produced no usable text.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed completion response: {0}")]
    Malformed(#[source] reqwest::Error),

    #[error("completion response carried no generated text")]
    MissingText,
}

impl CompletionError {
    /// Short machine-friendly label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Timeout(_) => "timeout",
            CompletionError::Transport(_) => "transport",
            CompletionError::Status { .. } => "status",
            CompletionError::Malformed(_) => "malformed",
            CompletionError::MissingText => "missing_text",
        }
    }
}

/// Client for a single completion endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    http: Client,
    url: Url,
    api_key: Option<String>,
    model: Option<String>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl CompletionClient {
    pub fn from_config(http: Client, config: &Config) -> Self {
        Self {
            http,
            url: config.completion_url.clone(),
            api_key: config.completion_api_key.clone(),
            model: config.completion_model.clone(),
            temperature: config.completion_temperature,
            max_tokens: config.completion_max_tokens,
            timeout: config.completion_timeout,
        }
    }

    /// Request a completion for `prompt` and return the raw generated text.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = CompletionRequest {
            prompt,
            model: self.model.as_deref(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        info!(
            prompt_chars = prompt.chars().count(),
            model = ?self.model,
            timeout_seconds = self.timeout.as_secs_f64(),
            "completion_request_starting"
        );

        let mut request = self
            .http
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await.map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status,
                body: preview(&body, 500).to_string(),
            });
        }

        let parsed: CompletionResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.timeout)
            } else {
                CompletionError::Malformed(e)
            }
        })?;

        let text = parsed.into_text().ok_or(CompletionError::MissingText)?;

        info!(
            status = status.as_u16(),
            text_chars = text.chars().count(),
            "completion_request_complete"
        );

        Ok(text)
    }

    fn classify(&self, e: reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout(self.timeout)
        } else {
            CompletionError::Transport(e)
        }
    }
}
