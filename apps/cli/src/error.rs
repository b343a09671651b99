//! # CLI Error Type
//!
//! Unified error type for `velmo` commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  Command Function → Result<T, AppError>                                 │
//! │       │                                                                 │
//! │       ├── ValidationError ──► shown as-is (the shopper can fix it)      │
//! │       ├── CoreError ────────► shown as-is (cart rules)                  │
//! │       ├── ConfigError ──────► shown as-is (the operator can fix it)     │
//! │       ├── DbError ──────────► logged with detail, generic text shown    │
//! │       └── BackendError ─────► logged with detail, generic text shown    │
//! │                                                                         │
//! │  main() prints `message` to stderr and exits with `code.exit_code()`.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use velmo_backend::BackendError;
use velmo_core::{CoreError, ValidationError};
use velmo_store::DbError;

use crate::config::ConfigError;

/// Error returned from CLI commands.
#[derive(Debug, Clone)]
pub struct AppError {
    /// Machine-readable category, also selects the exit code.
    pub code: ErrorCode,

    /// Shopper-facing message.
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Shop, product or order does not exist.
    NotFound,

    /// Input validation failed.
    ValidationError,

    /// Cart operation refused.
    CartError,

    /// Local storage failed.
    StorageError,

    /// Backend unreachable or answered with an error.
    BackendError,

    /// Backend asked us to slow down.
    RateLimited,

    /// Configuration missing or invalid.
    ConfigError,

    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// Process exit status for this category (sysexits-style).
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCode::ValidationError | ErrorCode::CartError => 65,
            ErrorCode::NotFound => 66,
            ErrorCode::BackendError | ErrorCode::RateLimited => 69,
            ErrorCode::Internal => 70,
            ErrorCode::StorageError => 74,
            ErrorCode::ConfigError => 78,
        }
    }
}

impl AppError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts local storage errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, "Local storage failed");
        match err {
            DbError::Open(_) | DbError::Migration(_) => AppError::new(
                ErrorCode::StorageError,
                "Impossible d'ouvrir les données locales",
            ),
            _ => AppError::new(
                ErrorCode::StorageError,
                "Erreur d'enregistrement des données locales",
            ),
        }
    }
}

/// Converts backend errors.
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => {
                tracing::debug!(what = %what, "Backend lookup found nothing");
                AppError::not_found("Introuvable")
            }
            BackendError::RateLimited(secs) => AppError::new(
                ErrorCode::RateLimited,
                format!("Trop de requêtes, réessayez dans {secs} s"),
            ),
            BackendError::InvalidUrl(_) | BackendError::InvalidConfig(_) => {
                tracing::error!(error = %err, "Backend settings rejected");
                AppError::new(ErrorCode::ConfigError, err.to_string())
            }
            _ => {
                tracing::error!(error = %err, "Backend request failed");
                AppError::new(
                    ErrorCode::BackendError,
                    "Une erreur est survenue. Veuillez réessayer.",
                )
            }
        }
    }
}

/// Converts core errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::QuantityTooLarge { .. } => AppError::validation(err.to_string()),
            CoreError::InvalidStatusTransition { .. } => AppError::internal(err.to_string()),
            _ => AppError::new(ErrorCode::CartError, err.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!(error = %err, "Output failed");
        AppError::internal("Erreur d'affichage")
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for CLI commands.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failures_are_generic() {
        let err: AppError = BackendError::Status {
            status: 500,
            body: "relation \"customer_orders\" does not exist".to_string(),
        }
        .into();

        assert_eq!(err.code, ErrorCode::BackendError);
        assert!(!err.message.contains("customer_orders"));
    }

    #[test]
    fn test_not_found_and_rate_limit() {
        let err: AppError = BackendError::NotFound("shops".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: AppError = BackendError::RateLimited(7).into();
        assert_eq!(err.code, ErrorCode::RateLimited);
        assert!(err.message.contains('7'));
    }

    #[test]
    fn test_core_errors_keep_their_message() {
        let err: AppError = CoreError::NotInCart("p9".to_string()).into();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(err.message.contains("p9"));

        let err: AppError = CoreError::Validation(ValidationError::required("customer_name")).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err: AppError = DbError::Query("no such table: carts".to_string()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("carts"));
    }

    #[test]
    fn test_exit_codes_are_distinct_from_success() {
        for code in [
            ErrorCode::NotFound,
            ErrorCode::ValidationError,
            ErrorCode::CartError,
            ErrorCode::StorageError,
            ErrorCode::BackendError,
            ErrorCode::RateLimited,
            ErrorCode::ConfigError,
            ErrorCode::Internal,
        ] {
            assert_ne!(code.exit_code(), 0);
        }
    }
}
