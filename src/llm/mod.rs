pub mod chat;

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Full chat completions URL; adapters fall back to their own default.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: crate::config::DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

/// Failure talking to the completion provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream returned {status}: {body}")]
    Status {
        status: StatusCode,
        body: String,
    },

    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) | LlmError::Timeout(_) => true,
            LlmError::Status { status, .. } =>
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS,
            LlmError::Malformed(_) => false,
        }
    }
}
