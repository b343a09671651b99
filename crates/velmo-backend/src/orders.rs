//! # Customer Orders
//!
//! Creating an order at checkout and reading it back for the receipt.
//!
//! ## Lookup by Reference
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shopper types        parsed as                 query                   │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  8b1d6e2a-0f3c-...    OrderReference::Id        id=eq.<uuid>            │
//! │  #vlm-0042            OrderReference::ShortRef  short_ref=eq.VLM-0042   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use crate::client::BackendClient;
use crate::error::BackendResult;
use velmo_core::validation::OrderReference;
use velmo_core::{CustomerOrder, NewCustomerOrder, OrderReceipt, Shop};

const CUSTOMER_ORDERS: &str = "customer_orders";

/// Columns read back after an insert.
const RECEIPT_COLUMNS: &str = "id,short_ref";

impl BackendClient {
    /// Inserts a pending order and returns its id and short reference.
    pub async fn insert_order(&self, order: &NewCustomerOrder) -> BackendResult<OrderReceipt> {
        let receipt: OrderReceipt = self
            .insert_returning(CUSTOMER_ORDERS, RECEIPT_COLUMNS, order)
            .await?;

        info!(
            order_id = %receipt.id,
            reference = %receipt.reference(),
            shop_id = %order.shop_id,
            total = order.total_amount.units(),
            lines = order.items_json.len(),
            "Order created"
        );
        Ok(receipt)
    }

    /// Reads an order back by id or short reference.
    pub async fn order_by_reference(
        &self,
        reference: &OrderReference,
    ) -> BackendResult<CustomerOrder> {
        let (column, value) = reference_filter(reference);
        self.get_object(CUSTOMER_ORDERS, &[(column, value.as_str())]).await
    }

    /// Reads an order and, when possible, the shop it was placed in.
    ///
    /// A failed shop lookup is logged and yields `None`; the receipt then
    /// uses a fallback header.
    pub async fn order_with_shop(
        &self,
        reference: &OrderReference,
    ) -> BackendResult<(CustomerOrder, Option<Shop>)> {
        let order = self.order_by_reference(reference).await?;

        let shop = match self.shop_by_id(&order.shop_id).await {
            Ok(shop) => Some(shop),
            Err(e) => {
                warn!(
                    order_id = %order.id,
                    shop_id = %order.shop_id,
                    error = %e,
                    "Shop of order unavailable"
                );
                None
            }
        };

        Ok((order, shop))
    }
}

/// Column and PostgREST filter value for a reference.
fn reference_filter(reference: &OrderReference) -> (&'static str, String) {
    match reference {
        OrderReference::Id(id) => ("id", format!("eq.{id}")),
        OrderReference::ShortRef(short_ref) => ("short_ref", format!("eq.{short_ref}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use velmo_core::validation::validate_order_reference;
    use velmo_core::{DeliveryMethod, OrderStatus};

    #[test]
    fn test_reference_filters() {
        let id = validate_order_reference("8B1D6E2A-0F3C-4C57-9A52-1F0D3B7E6C11").unwrap();
        assert_eq!(
            reference_filter(&id),
            ("id", "eq.8b1d6e2a-0f3c-4c57-9a52-1f0d3b7e6c11".to_string())
        );

        let short = validate_order_reference("#vlm-0042").unwrap();
        assert_eq!(
            reference_filter(&short),
            ("short_ref", "eq.VLM-0042".to_string())
        );
    }

    #[test]
    fn test_insert_response_decodes() {
        let receipt: OrderReceipt =
            crate::client::decode(r#"{"id":"8b1d6e2a-0f3c","short_ref":"VLM-0042"}"#).unwrap();
        assert_eq!(receipt.reference(), "VLM-0042");
    }

    #[test]
    fn test_stored_order_decodes() {
        let body = json!({
            "id": "8b1d6e2a-0f3c-4c57-9a52-1f0d3b7e6c11",
            "short_ref": null,
            "shop_id": "s1",
            "customer_name": "Aissatou",
            "customer_phone": "622000000",
            "customer_address": "Dixinn",
            "customer_location": { "lat": 9.55, "lng": -13.67 },
            "total_amount": 15000,
            "items_json": [
                { "id": "p1", "name": "Pain", "price": 5000, "quantity": 3 }
            ],
            "delivery_method": "delivery",
            "order_note": null,
            "status": "confirmed",
            "created_at": "2026-03-09T14:05:00+00:00"
        })
        .to_string();

        let order: CustomerOrder = crate::client::decode(&body).unwrap();
        assert_eq!(order.reference(), "8B1D6E2A");
        assert_eq!(order.total_amount.units(), 15_000);
        assert_eq!(order.items_json[0].quantity, 3);
        assert_eq!(order.delivery_method, DeliveryMethod::Delivery);
        assert_eq!(order.status, OrderStatus::Confirmed);
    }
}
