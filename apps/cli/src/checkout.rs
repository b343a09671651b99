//! # Checkout
//!
//! Submits the shopper's cart as a customer order.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout::submit()                               │
//! │                                                                         │
//! │  cart empty? ── yes ──► CheckoutOutcome::EmptyCart  (no request sent)   │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  NewCustomerOrder::from_cart()  ── invalid form ──► Err (cart intact)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gateway.insert_order()  ──────── failure ────────► Err (cart intact)   │
//! │       │ OrderReceipt { id, short_ref }                                  │
//! │       ▼                                                                 │
//! │  remember last order ref + customer details                             │
//! │  clear the cart and its stored copy                                     │
//! │  build receipt URL and WhatsApp deep link                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutOutcome::Placed(PlacedOrder)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Once the backend has accepted the order, local bookkeeping failures are
//! logged but do not turn the checkout into an error: the order exists.

use async_trait::async_trait;
use tracing::{info, warn};

use velmo_backend::{BackendClient, BackendResult};
use velmo_core::receipt::receipt_url;
use velmo_core::whatsapp::{deep_link, order_message};
use velmo_core::{Cart, CheckoutForm, CustomerInfo, NewCustomerOrder, OrderReceipt, Shop};
use velmo_store::Database;

use crate::error::AppResult;

/// Where orders are sent.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn insert_order(&self, order: &NewCustomerOrder) -> BackendResult<OrderReceipt>;
}

#[async_trait]
impl OrderGateway for BackendClient {
    async fn insert_order(&self, order: &NewCustomerOrder) -> BackendResult<OrderReceipt> {
        BackendClient::insert_order(self, order).await
    }
}

/// An order the backend accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub receipt: OrderReceipt,
    /// Public page for the order.
    pub receipt_url: String,
    /// Summary addressed to the merchant.
    pub message: String,
    /// `wa.me` link carrying `message`; `None` when the shop has no number.
    pub whatsapp_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Nothing to order; no request was sent.
    EmptyCart,
    Placed(PlacedOrder),
}

/// Checkout orchestrator.
pub struct Checkout<G> {
    gateway: G,
    db: Database,
    public_url: String,
}

impl<G: OrderGateway> Checkout<G> {
    pub fn new(gateway: G, db: Database, public_url: impl Into<String>) -> Self {
        Checkout {
            gateway,
            db,
            public_url: public_url.into(),
        }
    }

    /// Places the order for `cart`.
    ///
    /// On error the cart, in memory and stored, is left untouched so the
    /// shopper can retry.
    pub async fn submit(
        &self,
        shop: &Shop,
        cart: &mut Cart,
        form: &CheckoutForm,
    ) -> AppResult<CheckoutOutcome> {
        if cart.is_empty() {
            info!(shop_id = %shop.id, "Checkout skipped: cart is empty");
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let order = NewCustomerOrder::from_cart(shop, cart, form)?;
        let receipt = self.gateway.insert_order(&order).await?;

        self.remember(&receipt, form).await;

        cart.clear();
        if let Err(e) = self.db.carts().clear(&shop.id).await {
            warn!(shop_id = %shop.id, error = %e, "Stored cart not cleared");
        }

        let receipt_url = receipt_url(&self.public_url, &receipt.id);
        let message = order_message(
            shop,
            &order.items_json,
            order.total_amount,
            form,
            Some(&receipt.id),
            Some(&receipt_url),
        );
        let whatsapp_link = shop
            .whatsapp_number()
            .map(|number| deep_link(&number, &message));

        info!(
            shop_id = %shop.id,
            reference = %receipt.reference(),
            has_whatsapp = whatsapp_link.is_some(),
            "Checkout complete"
        );

        Ok(CheckoutOutcome::Placed(PlacedOrder {
            receipt,
            receipt_url,
            message,
            whatsapp_link,
        }))
    }

    /// Stores what the next session needs: the order reference for
    /// `velmo receipt` and `velmo track`, and the shopper's details.
    async fn remember(&self, receipt: &OrderReceipt, form: &CheckoutForm) {
        let prefs = self.db.preferences();

        if let Err(e) = prefs.set_last_order_ref(&lookup_reference(receipt)).await {
            warn!(order_id = %receipt.id, error = %e, "Last order reference not saved");
        }

        let customer = CustomerInfo {
            name: form.customer.name.trim().to_string(),
            phone: form.customer.phone.trim().to_string(),
            address: form.address().map(str::to_string),
            location: form.customer.location,
        };
        if let Err(e) = prefs.save_customer_info(&customer).await {
            warn!(error = %e, "Customer details not saved");
        }
    }
}

/// Reference that finds the order again: the short ref when the backend
/// assigned one, else the full id.
fn lookup_reference(receipt: &OrderReceipt) -> String {
    receipt
        .short_ref
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&receipt.id)
        .to_string()
}
