//! # Error Types
//!
//! ```text
//! ValidationError ──► CoreError ──► AppError (CLI) ──► terminal
//!   bad input          cart/order      exit code +
//!                      rules           shopper message
//! ```
//!
//! Storage and backend failures have their own enums (`DbError`,
//! `BackendError`) in the crates that produce them.

use thiserror::Error;

/// Cart and order rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Inactive or hidden products cannot be put in the cart.
    #[error("Product is not available: {0}")]
    ProductUnavailable(String),

    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    #[error("Cart is empty")]
    EmptyCart,

    /// A cart is only ever submitted to the shop it was filled in.
    #[error("Cart belongs to shop {cart_shop}, not {shop}")]
    ShopMismatch { cart_shop: String, shop: String },

    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// See `OrderStatus::can_transition_to`.
    #[error("Order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Shopper input rejected before any request is built.
///
/// `field` names the offending input as it appears in the order payload
/// (`customer_phone`, `slug`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn required(field: &'static str) -> Self {
        ValidationError::Required { field }
    }

    pub fn invalid_format(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the rejected input.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 1000,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1000 exceeds maximum allowed (999)");

        let err = CoreError::ShopMismatch {
            cart_shop: "a".to_string(),
            shop: "b".to_string(),
        };
        assert_eq!(err.to_string(), "Cart belongs to shop a, not b");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: CoreError = ValidationError::required("customer_phone").into();

        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.to_string(), "customer_phone is required");
    }

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::invalid_format("slug", "unexpected character '/'");
        assert_eq!(err.field(), "slug");
        assert_eq!(
            err.to_string(),
            "slug has invalid format: unexpected character '/'"
        );
    }
}
