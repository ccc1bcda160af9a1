//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM calls
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether retrying the call could help
    ///
    /// Drives the client's retry loop. Rate limits are retryable too,
    /// but only after the server-supplied delay, so the client returns
    /// them to the caller instead of spinning.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => matches!(status, 408 | 500 | 502 | 503 | 504 | 529),
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::MissingCredential { .. } => false,
            LlmError::Json(_) => false,
        }
    }
}
