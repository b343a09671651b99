//! # Domain Types
//!
//! Core domain types shared by the store, the backend client and the CLI.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Shop       │   │     Product     │   │  CustomerOrder  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  shop_id (FK)   │   │  shop_id (FK)   │       │
//! │  │  slug (URL)     │   │  price_sale     │   │  short_ref      │       │
//! │  │  is_public      │   │  quantity       │   │  items_json ────┼──┐    │
//! │  └─────────────────┘   └─────────────────┘   │  status         │  │    │
//! │                                              └─────────────────┘  │    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │    │
//! │  │  OrderStatus    │   │ DeliveryMethod  │   │   OrderItem     │◄─┘    │
//! │  │  pending ...    │   │  pickup         │   │  (frozen copy)  │       │
//! │  │  cancelled      │   │  delivery       │   │  id,name,price  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Shops are addressed two ways:
//! - `id`: UUID - immutable, used for relations (products, orders)
//! - `slug`: human-readable URL segment, what the shopper types
//!
//! Orders likewise carry a UUID `id` and a short `short_ref` for tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::money::Money;

/// Products with this many units or fewer are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

fn default_true() -> bool {
    true
}

/// Nullable column: `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Nullable flag that defaults to set: only an explicit `false` clears it.
fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|flag| flag.unwrap_or(true))
}

// =============================================================================
// Shop
// =============================================================================

/// A merchant storefront.
///
/// Only rows with `is_public = true` are visible to shoppers; the backend
/// query filters on it, so a private shop looks exactly like a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,

    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,

    #[serde(default)]
    pub delivery_info: Option<String>,
    #[serde(default)]
    pub return_policy: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_public: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_active: bool,

    #[serde(default)]
    pub orders_count: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Shop {
    /// Logo path, preferring the newer `logo_url` column.
    pub fn logo(&self) -> Option<&str> {
        non_blank(&self.logo_url).or_else(|| non_blank(&self.logo))
    }

    /// Cover path, preferring the newer `cover_url` column.
    pub fn cover(&self) -> Option<&str> {
        non_blank(&self.cover_url).or_else(|| non_blank(&self.cover))
    }

    /// Number the shopper should message: WhatsApp first, then the main phone.
    pub fn contact_phone(&self) -> Option<&str> {
        non_blank(&self.whatsapp).or_else(|| non_blank(&self.phone))
    }

    /// Contact number reduced to digits, as `wa.me` links expect.
    pub fn whatsapp_number(&self) -> Option<String> {
        self.contact_phone()
            .map(|p| p.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|digits| !digits.is_empty())
    }

    /// Currency code for price display.
    pub fn currency_code(&self) -> &str {
        non_blank(&self.currency).unwrap_or(crate::DEFAULT_CURRENCY)
    }
}

// =============================================================================
// Product
// =============================================================================

/// Stock badge shown next to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Available,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Shopper-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Available => "Disponible",
            StockStatus::LowStock => "Stock faible",
            StockStatus::OutOfStock => "Rupture",
        }
    }
}

/// A product listed by a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,

    /// Sale price. Missing or malformed prices decode as zero.
    #[serde(default)]
    pub price_sale: Money,

    /// Units in stock, when the merchant tracks it.
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub stock_alert: Option<i64>,

    #[serde(default)]
    pub photo_url: Option<String>,

    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_active: bool,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_visible: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Stock badge for the catalog.
    pub fn stock_status(&self) -> StockStatus {
        if !self.is_active {
            return StockStatus::OutOfStock;
        }
        match self.quantity {
            Some(0) => StockStatus::OutOfStock,
            Some(q) if q <= LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ => StockStatus::Available,
        }
    }

    /// Whether the shopper may put this product in the cart.
    pub fn is_orderable(&self) -> bool {
        self.is_active && self.is_visible
    }
}

// =============================================================================
// Order Line Snapshot
// =============================================================================

/// A line of a submitted order (`items_json`).
///
/// Snapshot pattern: name and price are copied from the cart at submission,
/// so later catalog edits never rewrite a historical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product id at time of order.
    pub id: String,
    /// Product name at time of order (frozen).
    pub name: String,
    /// Unit price at time of order (frozen).
    #[serde(default)]
    pub price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl OrderItem {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Location
// =============================================================================

/// GPS position shared by the customer for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

impl GeoLocation {
    /// Google Maps link pointing at this position.
    pub fn maps_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lng)
    }
}

// =============================================================================
// Delivery Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Customer collects the order at the shop.
    #[default]
    Pickup,
    /// Merchant delivers to the customer's address.
    Delivery,
}

impl DeliveryMethod {
    /// Shopper-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "Retrait en boutique",
            DeliveryMethod::Delivery => "Livraison à domicile",
        }
    }

    #[inline]
    pub fn is_delivery(&self) -> bool {
        matches!(self, DeliveryMethod::Delivery)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of a customer order.
///
/// ## Lifecycle
/// ```text
/// pending ──► confirmed ──► preparing ──┬──► ready ────┬──► delivered
///    │            │             │       └──► shipped ──┘
///    │            │             │             │
///    └────────────┴─────────────┴─────────────┴──────────► cancelled
/// ```
/// The merchant drives these moves from their own app; the storefront only
/// creates `pending` orders and displays the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Shipped,
    Delivered,
    Cancelled,
    /// Any status this version does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Shopper-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Confirmed => "Confirmée",
            OrderStatus::Preparing => "Préparation",
            OrderStatus::Ready => "Prête",
            OrderStatus::Shipped => "Expédiée",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Cancelled => "Annulée",
            OrderStatus::Unknown => "Inconnu",
        }
    }

    /// Banner colour used on receipts.
    pub fn color(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "#f59e0b",
            OrderStatus::Confirmed | OrderStatus::Delivered => "#10b981",
            OrderStatus::Preparing => "#3b82f6",
            OrderStatus::Ready => "#8b5cf6",
            OrderStatus::Shipped => "#6366f1",
            OrderStatus::Cancelled => "#ef4444",
            OrderStatus::Unknown => "#6b7280",
        }
    }

    /// Delivered and cancelled orders never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, next) {
            (from, Cancelled) => !from.is_terminal() && *from != Unknown,
            (Pending, Confirmed)
            | (Confirmed, Preparing)
            | (Preparing, Ready)
            | (Preparing, Shipped)
            | (Ready, Delivered)
            | (Shipped, Delivered) => true,
            _ => false,
        }
    }

    /// Checked transition, for callers that want an error instead of a bool.
    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: format!("{self:?}").to_lowercase(),
                to: format!("{next:?}").to_lowercase(),
            })
        }
    }
}

// =============================================================================
// Customer Order
// =============================================================================

/// A stored customer order, as read back from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: String,
    #[serde(default)]
    pub short_ref: Option<String>,
    pub shop_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub customer_location: Option<GeoLocation>,

    #[serde(default)]
    pub total_amount: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items_json: Vec<OrderItem>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub order_note: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: OrderStatus,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl CustomerOrder {
    /// Reference shown to the shopper: the short ref, else a shortened id.
    pub fn reference(&self) -> String {
        match non_blank(&self.short_ref) {
            Some(short_ref) => short_ref.to_string(),
            None => short_id(&self.id),
        }
    }
}

/// First 8 characters of an id, upper-cased (`#3F2A9C1B`).
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect::<String>().to_uppercase()
}

// =============================================================================
// Shop Events
// =============================================================================

/// Kind of storefront analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopEventType {
    Visit,
    ViewProduct,
    AddToCart,
    Search,
    CategoryClick,
    CheckoutStart,
    CheckoutSuccess,
}

/// An analytics row sent to the `shop_events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopEvent {
    pub shop_id: String,
    pub session_id: String,
    pub event_type: ShopEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ShopEvent {
    /// Creates an event with no optional attributes.
    pub fn new(
        shop_id: impl Into<String>,
        session_id: impl Into<String>,
        event_type: ShopEventType,
    ) -> Self {
        ShopEvent {
            shop_id: shop_id.into(),
            session_id: session_id.into(),
            event_type,
            product_id: None,
            category: None,
            search_query: None,
            metadata: None,
        }
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================


// =============================================================================
// Unit Tests
// =============================================================================
