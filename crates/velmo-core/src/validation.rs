//! # Validation Module
//!
//! Input validation for everything the shopper types before it reaches the
//! backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI arguments (clap)                                          │
//! │  └── Types and required flags                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Slugs, quantities, order references                                │
//! │  └── Checkout form fields (name, phone)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Hosted backend                                                │
//! │  └── Column constraints and row-level security                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use velmo_core::validation::{validate_slug, validate_quantity};
//!
//! validate_slug("boutique-kaloum").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_SLUG_LEN: usize = 100;
pub const MAX_CUSTOMER_NAME_LEN: usize = 120;
pub const MIN_PHONE_DIGITS: usize = 6;
pub const MAX_PHONE_DIGITS: usize = 15;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a shop slug and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - Letters, digits, hyphens and underscores only
///
/// Case is kept: the backend matches slugs case-insensitively.
///
/// ## Example
/// ```rust
/// use velmo_core::validation::validate_slug;
///
/// assert_eq!(validate_slug(" Chez-Fatou ").unwrap(), "Chez-Fatou");
/// assert!(validate_slug("").is_err());
/// assert!(validate_slug("a/b").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<String> {
    let slug = slug.trim();

    if slug.is_empty() {
        return Err(ValidationError::required("slug"));
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(ValidationError::TooLong {
            field: "slug",
            max: MAX_SLUG_LEN,
        });
    }

    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(ValidationError::invalid_format(
            "slug",
            format!("unexpected character '{bad}'"),
        ));
    }

    Ok(slug.to_string())
}

/// Validates the customer's name and returns it trimmed.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("customer_name"));
    }

    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_name",
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a phone number and returns it trimmed.
///
/// ## Rules
/// ```text
/// "+224 622 00 12 34"   → ok   (12 digits, separators allowed)
/// "622-00-12-34"        → ok
/// ""                    → Required
/// "12345"               → InvalidFormat (fewer than 6 digits)
/// "622 abc 123"         → InvalidFormat (letters)
/// ```
///
/// The number is stored as typed; only `wa.me` links strip it to digits.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::required("customer_phone"));
    }

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')');
    if !phone.chars().all(allowed) {
        return Err(ValidationError::invalid_format(
            "customer_phone",
            "only digits, spaces and + - . ( ) are allowed",
        ));
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(ValidationError::invalid_format(
            "customer_phone",
            format!("must contain {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"),
        ));
    }

    Ok(phone.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Shopper Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  velmo cart add boutique-kaloum <product> --qty 5                       │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── qty <= 0?   → Error: "quantity must be positive"              │
/// │       ├── qty > 999?  → Error: "quantity must be between 1 and 999"     │
/// │       └── OK          → Cart::add_item                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity",
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Order References
// =============================================================================

/// How the shopper identified an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderReference {
    /// Full order id (UUID), as found in receipt links.
    Id(String),
    /// Short human reference, normalized to upper case.
    ShortRef(String),
}

/// Validates an order reference typed by the shopper.
///
/// ## Rules
/// - A UUID is an order id (`#` prefix and case are ignored)
/// - Anything else must be a short ref of 4 to 16 letters, digits or hyphens
///
/// ## Example
/// ```rust
/// use velmo_core::validation::{validate_order_reference, OrderReference};
///
/// assert_eq!(
///     validate_order_reference("#vlm-4821").unwrap(),
///     OrderReference::ShortRef("VLM-4821".to_string())
/// );
/// assert!(matches!(
///     validate_order_reference("550e8400-e29b-41d4-a716-446655440000").unwrap(),
///     OrderReference::Id(_)
/// ));
/// assert!(validate_order_reference("x").is_err());
/// ```
pub fn validate_order_reference(reference: &str) -> ValidationResult<OrderReference> {
    let reference = reference.trim().trim_start_matches('#');

    if reference.is_empty() {
        return Err(ValidationError::required("reference"));
    }

    if let Ok(id) = uuid::Uuid::parse_str(reference) {
        return Ok(OrderReference::Id(id.to_string()));
    }

    let len = reference.chars().count();
    if !(4..=16).contains(&len) {
        return Err(ValidationError::invalid_format(
            "reference",
            "must be an order id or a 4 to 16 character reference",
        ));
    }

    if !reference
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::invalid_format(
            "reference",
            "must contain only letters, numbers and hyphens",
        ));
    }

    Ok(OrderReference::ShortRef(reference.to_ascii_uppercase()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert_eq!(validate_slug("boutique-kaloum").unwrap(), "boutique-kaloum");
        assert_eq!(validate_slug("Chez_Fatou2").unwrap(), "Chez_Fatou2");

        assert!(validate_slug("").is_err());
        assert!(validate_slug("   ").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("../etc").is_err());
        assert!(validate_slug(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name("  Aïssatou ").unwrap(), "Aïssatou");
        assert!(matches!(
            validate_customer_name(" "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_customer_name(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+224 622 00 12 34").is_ok());
        assert!(validate_phone("622-00-12-34").is_ok());
        assert!(validate_phone("(224) 622.00.12.34").is_ok());

        assert!(matches!(
            validate_phone(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("622 abc 123").is_err());
        assert!(validate_phone(&"1".repeat(16)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_order_reference() {
        assert_eq!(
            validate_order_reference("550E8400-E29B-41D4-A716-446655440000").unwrap(),
            OrderReference::Id("550e8400-e29b-41d4-a716-446655440000".to_string())
        );
        assert_eq!(
            validate_order_reference(" 3f2a9c1b ").unwrap(),
            OrderReference::ShortRef("3F2A9C1B".to_string())
        );

        assert!(validate_order_reference("").is_err());
        assert!(validate_order_reference("#").is_err());
        assert!(validate_order_reference("abc").is_err());
        assert!(validate_order_reference("VLM 4821").is_err());
        assert!(validate_order_reference(&"A".repeat(17)).is_err());
    }
}
