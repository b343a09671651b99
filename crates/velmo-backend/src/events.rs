//! # Shop Events
//!
//! Storefront analytics (visits, product views, add-to-cart, checkout).
//! Recording is best-effort: a failure is logged and never reaches the
//! shopper's flow.

use tracing::{debug, warn};

use crate::client::BackendClient;
use velmo_core::ShopEvent;

const SHOP_EVENTS: &str = "shop_events";

impl BackendClient {
    /// Sends one analytics event. Never fails.
    pub async fn record_event(&self, event: &ShopEvent) {
        match self.insert(SHOP_EVENTS, event).await {
            Ok(()) => debug!(
                shop_id = %event.shop_id,
                event_type = ?event.event_type,
                "Event recorded"
            ),
            Err(e) => warn!(
                shop_id = %event.shop_id,
                event_type = ?event.event_type,
                error = %e,
                "Event not recorded"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{BackendClient, BackendConfig};
    use velmo_core::{ShopEvent, ShopEventType};

    #[tokio::test]
    async fn test_record_event_swallows_failures() {
        // Nothing listens on port 9; the connection is refused.
        let config = BackendConfig::new("http://127.0.0.1:9", "anon-key")
            .unwrap()
            .timeout(Duration::from_millis(500));
        let client = BackendClient::new(config).unwrap();

        let event =
            ShopEvent::new("s1", "session-1", ShopEventType::ViewProduct).with_product("p1");
        client.record_event(&event).await;
    }

    #[test]
    fn test_event_payload_skips_empty_fields() {
        let event = ShopEvent::new("s1", "session-1", ShopEventType::Search).with_search("riz");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event_type"], "search");
        assert_eq!(value["search_query"], "riz");
        assert!(value.get("product_id").is_none());
    }
}
