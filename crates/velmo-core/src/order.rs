//! # Order Submission
//!
//! Turns a cart and a checkout form into the row inserted into the backend's
//! `customer_orders` table.
//!
//! ## Checkout Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart ───────────────┐                                                  │
//! │  (live lines)        │                                                  │
//! │                      ▼                                                  │
//! │  CheckoutForm ──► NewCustomerOrder::from_cart() ──► POST customer_orders│
//! │  (name, phone,       │                                   │              │
//! │   method, note)      │ items_json: frozen OrderItems     │              │
//! │                      │ total_amount: cart total          ▼              │
//! │                      │ status: pending            OrderReceipt          │
//! │                      │                            { id, short_ref }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{short_id, DeliveryMethod, GeoLocation, OrderItem, OrderStatus, Shop};
use crate::validation::{validate_customer_name, validate_phone, ValidationResult};

/// Maximum length of the free-text order note.
pub const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// Customer Info
// =============================================================================

/// Contact details the shopper enters at checkout.
///
/// Remembered on the device so the next checkout is pre-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

/// Everything the checkout form collects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub customer: CustomerInfo,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub note: Option<String>,
}

impl CheckoutForm {
    /// Checks the form before any request is built.
    ///
    /// ## Rules
    /// - Name and phone are always required
    /// - The address is required only for home delivery
    /// - The note is optional, at most [`MAX_NOTE_LEN`] characters
    pub fn validate(&self) -> ValidationResult<()> {
        validate_customer_name(&self.customer.name)?;
        validate_phone(&self.customer.phone)?;

        if self.delivery_method.is_delivery() && self.address().is_none() {
            return Err(ValidationError::required("customer_address"));
        }

        if let Some(note) = self.note() {
            if note.chars().count() > MAX_NOTE_LEN {
                return Err(ValidationError::TooLong {
                    field: "order_note",
                    max: MAX_NOTE_LEN,
                });
            }
        }

        Ok(())
    }

    /// Trimmed address, `None` when blank.
    pub fn address(&self) -> Option<&str> {
        trimmed(self.customer.address.as_deref())
    }

    /// Trimmed note, `None` when blank.
    pub fn note(&self) -> Option<&str> {
        trimmed(self.note.as_deref())
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Insert Payload
// =============================================================================

/// The `customer_orders` row sent to the backend.
///
/// `items` duplicates `items_json` for merchant apps that still read the
/// older column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCustomerOrder {
    pub shop_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub customer_location: Option<GeoLocation>,
    pub items: Vec<OrderItem>,
    pub items_json: Vec<OrderItem>,
    pub total_amount: Money,
    pub delivery_method: DeliveryMethod,
    pub order_note: Option<String>,
    pub status: OrderStatus,
}

impl NewCustomerOrder {
    /// Builds the insert payload from the shopper's cart.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when the cart has no lines
    /// - [`CoreError::ShopMismatch`] when the cart belongs to another shop
    /// - [`CoreError::Validation`] when the form is incomplete
    pub fn from_cart(shop: &Shop, cart: &Cart, form: &CheckoutForm) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        if cart.shop_id != shop.id {
            return Err(CoreError::ShopMismatch {
                cart_shop: cart.shop_id.clone(),
                shop: shop.id.clone(),
            });
        }

        form.validate()?;

        let delivery = form.delivery_method.is_delivery();
        let items = cart.order_items();

        Ok(NewCustomerOrder {
            shop_id: shop.id.clone(),
            customer_name: form.customer.name.trim().to_string(),
            customer_phone: form.customer.phone.trim().to_string(),
            customer_address: form.address().filter(|_| delivery).map(str::to_string),
            customer_location: form.customer.location.filter(|_| delivery),
            items: items.clone(),
            items_json: items,
            total_amount: cart.total_amount(),
            delivery_method: form.delivery_method,
            order_note: form.note().map(str::to_string),
            status: OrderStatus::Pending,
        })
    }
}

// =============================================================================
// Insert Response
// =============================================================================

/// What the backend returns for a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: String,
    #[serde(default)]
    pub short_ref: Option<String>,
}

impl OrderReceipt {
    /// Reference to give the shopper for tracking.
    pub fn reference(&self) -> String {
        match trimmed(self.short_ref.as_deref()) {
            Some(short_ref) => short_ref.to_string(),
            None => short_id(&self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{product, shop};

    fn form(method: DeliveryMethod) -> CheckoutForm {
        CheckoutForm {
            customer: CustomerInfo {
                name: "  Mamadou Diallo ".to_string(),
                phone: " 622 00 12 34".to_string(),
                address: Some("Kaloum, rue KA-020".to_string()),
                location: Some(GeoLocation {
                    lat: 9.5092,
                    lng: -13.7122,
                }),
            },
            delivery_method: method,
            note: Some("   ".to_string()),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new("shop-1");
        cart.add_item(&product("1", 12_500), 2).unwrap();
        cart.add_item(&product("2", 3_000), 1).unwrap();
        cart
    }

    #[test]
    fn test_pickup_payload_drops_address_and_location() {
        let order =
            NewCustomerOrder::from_cart(&shop(), &cart(), &form(DeliveryMethod::Pickup)).unwrap();

        assert_eq!(order.shop_id, "shop-1");
        assert_eq!(order.customer_name, "Mamadou Diallo");
        assert_eq!(order.customer_phone, "622 00 12 34");
        assert_eq!(order.customer_address, None);
        assert_eq!(order.customer_location, None);
        assert_eq!(order.order_note, None);
        assert_eq!(order.total_amount.units(), 28_000);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items, order.items_json);
        assert_eq!(order.items_json.len(), 2);
    }

    #[test]
    fn test_delivery_payload_keeps_address_and_location() {
        let mut form = form(DeliveryMethod::Delivery);
        form.note = Some(" Appeler avant ".to_string());

        let order = NewCustomerOrder::from_cart(&shop(), &cart(), &form).unwrap();
        assert_eq!(
            order.customer_address.as_deref(),
            Some("Kaloum, rue KA-020")
        );
        assert!(order.customer_location.is_some());
        assert_eq!(order.order_note.as_deref(), Some("Appeler avant"));
    }

    #[test]
    fn test_payload_json_shape() {
        let order =
            NewCustomerOrder::from_cart(&shop(), &cart(), &form(DeliveryMethod::Pickup)).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["delivery_method"], "pickup");
        assert_eq!(json["total_amount"], 28_000);
        assert!(json["customer_address"].is_null());
        assert!(json["order_note"].is_null());
        assert_eq!(json["items_json"][0]["price"], 12_500);
        assert_eq!(json["items_json"][0]["quantity"], 2);
        assert_eq!(json["items"], json["items_json"]);
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = NewCustomerOrder::from_cart(
            &shop(),
            &Cart::new("shop-1"),
            &form(DeliveryMethod::Pickup),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_cart_from_other_shop_rejected() {
        let mut other = shop();
        other.id = "shop-2".to_string();

        let err = NewCustomerOrder::from_cart(&other, &cart(), &form(DeliveryMethod::Pickup))
            .unwrap_err();
        assert!(matches!(err, CoreError::ShopMismatch { .. }));
    }

    #[test]
    fn test_form_validation() {
        assert!(form(DeliveryMethod::Pickup).validate().is_ok());

        let mut f = form(DeliveryMethod::Delivery);
        f.customer.address = Some("  ".to_string());
        assert!(matches!(
            f.validate(),
            Err(ValidationError::Required { .. })
        ));

        // Address is optional for pickup.
        f.delivery_method = DeliveryMethod::Pickup;
        assert!(f.validate().is_ok());

        f.customer.phone = String::new();
        assert!(f.validate().is_err());

        let mut f = form(DeliveryMethod::Pickup);
        f.customer.name = " ".to_string();
        assert!(f.validate().is_err());

        let mut f = form(DeliveryMethod::Pickup);
        f.note = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_receipt_reference() {
        let receipt: OrderReceipt =
            serde_json::from_str(r#"{"id": "3f2a9c1b-0000-0000-0000-000000000000", "short_ref": null}"#)
                .unwrap();
        assert_eq!(receipt.reference(), "3F2A9C1B");

        let receipt = OrderReceipt {
            short_ref: Some("VLM-4821".to_string()),
            ..receipt
        };
        assert_eq!(receipt.reference(), "VLM-4821");
    }
}
