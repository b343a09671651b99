//! # Backend Error Types
//!
//! Error types for calls to the hosted backend.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Backend Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidUrl     │  │  Http           │  │  Status (non-2xx)       │ │
//! │  │  InvalidConfig  │  │  RateLimited    │  │  NotFound (no row)      │ │
//! │  │                 │  │                 │  │  Parse (bad JSON)       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failure of a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Backend URL could not be parsed or joined.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Client settings rejected before any request is made.
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend asked us to slow down.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A single-row lookup matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether the call may succeed if repeated later.
    ///
    /// The client never retries on its own; callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Http(e) => e.is_timeout() || e.is_connect(),
            BackendError::RateLimited(_) => true,
            BackendError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");

        let err = BackendError::Status {
            status: 400,
            body: "bad filter".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 400: bad filter");
    }

    #[test]
    fn test_transient_errors() {
        assert!(BackendError::RateLimited(1).is_transient());
        assert!(BackendError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!BackendError::Status {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!BackendError::NotFound("shop".to_string()).is_transient());
    }
}
