//! # velmo-core: Pure Business Logic for the Velmo Storefront
//!
//! This crate holds the storefront's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Velmo Storefront Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      velmo CLI (apps/cli)                       │   │
//! │  │   shop ──► product ──► cart ──► checkout ──► receipt            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ velmo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ catalog │ │  order  │  │   │
//! │  │   │  Shop   │ │  Money  │ │  Cart   │ │  Query  │ │ Payload │  │   │
//! │  │   │ Product │ │  GNF    │ │ Totals  │ │  Sort   │ │  Form   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │          ┌──────────┐ ┌──────────┐ ┌────────────┐               │   │
//! │  │          │ receipt  │ │ whatsapp │ │ validation │               │   │
//! │  │          └──────────┘ └──────────┘ └────────────┘               │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                    │                               │                    │
//! │  ┌─────────────────▼─────────────┐ ┌───────────────▼───────────────┐   │
//! │  │   velmo-store (SQLite)        │ │   velmo-backend (REST)        │   │
//! │  │   cart, preferences           │ │   shops, products, orders     │   │
//! │  └───────────────────────────────┘ └───────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Shop, Product, CustomerOrder, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart store with merge and quantity rules
//! - [`catalog`] - Search, filters, sorting and recommendations
//! - [`order`] - Checkout form and order payload construction
//! - [`receipt`] - Fixed-width receipt ticket rendering
//! - [`whatsapp`] - Merchant message and deep links
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use velmo_core::money::Money;
//!
//! let price = Money::from_units(12_500);
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.format_amount("GNF"), "25 000 GNF");
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod receipt;
pub mod types;
pub mod validation;
pub mod whatsapp;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{CheckoutForm, CustomerInfo, NewCustomerOrder, OrderReceipt};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Catches typing 1000 instead of 10 in the quantity field.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Currency used by the storefront when a shop does not declare one.
pub const DEFAULT_CURRENCY: &str = "GNF";
