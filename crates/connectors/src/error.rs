//! Error types for connectors
//!
//! The orchestrator needs exactly two judgements about a connector error:
//! is it fatal for the whole run (credentials, malformed query - retrying
//! other keys would fail the same way), and is it worth retrying the same
//! request (network, 5xx, timeout). Everything else is a per-key skip.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during connector operations
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Failed to initialize connector (e.g., HTTP client creation failed)
    #[error("failed to initialize connector: {0}")]
    Init(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid entity format (repository id, bibcode)
    #[error("invalid entity format: {0}")]
    InvalidEntity(String),

    /// Entity does not exist at the source
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Authentication failed; aborts the whole run
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The source rejected the query itself; aborts the whole run
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// Quota exhausted; the paginator suspends until `reset` and resumes.
    /// Not a failure - this never reaches the orchestrator.
    #[error("rate limited until {reset}")]
    RateLimited { reset: DateTime<Utc> },

    /// Transient failure that survived all retry attempts
    #[error("transient source failure after {attempts} attempts: {last_error}")]
    Transient { attempts: u32, last_error: String },

    /// Pagination safety cap breached; suggests a protocol change upstream
    #[error("pagination exceeded safety cap of {max_pages} pages")]
    PaginationOverrun { max_pages: u32 },
}

impl ConnectorError {
    /// Whether this error should abort the entire run rather than skip one
    /// repository/publication
    pub fn is_fatal(&self) -> bool {
        match self {
            ConnectorError::AuthFailed(_)
            | ConnectorError::MalformedQuery(_)
            | ConnectorError::Init(_) => true,
            ConnectorError::Http(e) => {
                matches!(e.status(), Some(s) if s.as_u16() == 401 || s.as_u16() == 403)
            }
            _ => false,
        }
    }

    /// Whether retrying the same request may help
    pub fn is_retryable(&self) -> bool {
        match self {
            ConnectorError::Http(e) => is_retryable_http(e),
            ConnectorError::Transient { .. } => true,
            _ => false,
        }
    }
}

/// Retry on timeout, connection errors, and 5xx responses
pub(crate) fn is_retryable_http(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    if let Some(status) = error.status() {
        return status.is_server_error();
    }
    false
}
