//! # Cart
//!
//! The shopper's cart for one shop: an ordered list of (product, quantity)
//! lines with derived totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Operation               Cart Change           │
//! │  ──────────────           ─────────               ───────────           │
//! │                                                                         │
//! │  "Ajouter" ──────────────► add_item() ──────────► push or qty += n      │
//! │                                                                         │
//! │  + / - buttons ──────────► adjust_quantity() ───► qty = max(0, q + d)   │
//! │                                                                         │
//! │  Type a quantity ────────► set_quantity() ──────► qty = max(0, n)       │
//! │                                                                         │
//! │  Trash icon ─────────────► remove_item() ───────► line removed          │
//! │                                                                         │
//! │  Order submitted ────────► clear() ─────────────► no lines              │
//! │                                                                         │
//! │  A quantity of 0 never survives: the line is dropped.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisting the cart is velmo-store's job; this type only holds state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{OrderItem, Product};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A line in the cart.
///
/// The whole product row is kept so the cart can be shown offline with the
/// price the shopper saw when adding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i64,
}

impl CartItem {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price_sale.multiply_quantity(self.quantity)
    }

    /// Frozen order line for submission.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            id: self.product.id.clone(),
            name: self.product.name.clone(),
            price: self.product.price_sale,
            quantity: self.quantity,
            photo_url: self.product.photo_url.clone(),
        }
    }
}

/// The shopping cart of one shop.
///
/// ## Invariants
/// - Lines are unique by product id (adding again increases quantity)
/// - Every line has quantity ≥ 1
/// - At most [`MAX_CART_ITEMS`] lines, each at most [`MAX_ITEM_QUANTITY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Shop the cart belongs to.
    pub shop_id: String,

    /// Lines in insertion order.
    pub items: Vec<CartItem>,

    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for a shop.
    pub fn new(shop_id: impl Into<String>) -> Self {
        Cart {
            shop_id: shop_id.into(),
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases its quantity if already present.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 1 {
            return Err(ValidationError::MustBePositive {
                field: "quantity",
            }
            .into());
        }

        if !product.is_orderable() {
            return Err(CoreError::ProductUnavailable(product.name.clone()));
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            self.touch();
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem {
            product: product.clone(),
            quantity,
        });
        self.touch();
        Ok(())
    }

    /// Changes a line's quantity by `delta`; reaching zero removes the line.
    ///
    /// Returns the new quantity (0 when the line was removed).
    pub fn adjust_quantity(&mut self, product_id: &str, delta: i64) -> CoreResult<i64> {
        let current = self
            .quantity_of(product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        self.set_quantity(product_id, current.saturating_add(delta))
    }

    /// Sets a line's quantity; zero or negative removes the line.
    ///
    /// Returns the new quantity (0 when the line was removed).
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<i64> {
        let index = self
            .items
            .iter()
            .position(|i| i.product.id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        let quantity = quantity.max(0);
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity;
        }
        self.touch();
        Ok(quantity)
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product.id != product_id);

        if self.items.len() == initial_len {
            return Err(CoreError::NotInCart(product_id.to_string()));
        }
        self.touch();
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Quantity of a product in the cart, if present.
    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.items
            .iter()
            .find(|i| i.product.id == product_id)
            .map(|i| i.quantity)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities over all lines.
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of unit price × quantity over all lines.
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Frozen order lines for submission.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items.iter().map(CartItem::to_order_item).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Cart summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_items: i64,
    pub total_amount: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_items: cart.total_items(),
            total_amount: cart.total_amount(),
        }
    }
}
