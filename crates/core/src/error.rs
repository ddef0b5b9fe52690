//! Error types for the RustedTutor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the orchestration layer
//! only ever surfaces [`ValidationError`] to its callers.

use thiserror::Error;

/// The top-level error type for all RustedTutor operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Model output parsing ---
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    // --- Caller input ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether a second attempt could plausibly succeed.
    ///
    /// Network failures, timeouts, rate limits and 5xx responses are
    /// transient; authentication and configuration failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::NotConfigured(_) | Self::EmptyResponse => false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Retrieval service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid retrieval response: {0}")]
    InvalidResponse(String),

    #[error("Retriever not configured: {0}")]
    NotConfigured(String),
}

/// Model output did not match the expected JSON or list shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Model output was empty")]
    Empty,
}

/// Caller-supplied input is missing or malformed.
///
/// This is the only failure an orchestration operation returns; everything
/// else degrades into the operation's result payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid role '{0}': expected 'user' or 'assistant'")]
    InvalidRole(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
