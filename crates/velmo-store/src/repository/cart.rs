//! # Cart Repository
//!
//! Persists the shopper's cart per shop so it survives restarts.
//!
//! ## Save Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION per save                           │
//! │                                                                         │
//! │  1. DELETE FROM cart_items WHERE shop_id = ?                            │
//! │  2. cart empty?                                                         │
//! │       ├── yes → DELETE FROM carts WHERE shop_id = ?                     │
//! │       └── no  → UPSERT carts(shop_id, updated_at)                       │
//! │                 INSERT one cart_items row per line (position = index)   │
//! │  3. COMMIT                                                              │
//! │                                                                         │
//! │  The stored cart is always a complete copy of one in-memory state,      │
//! │  never a mix of two.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use velmo_core::{Cart, CartItem, Product};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: String,
    product_json: String,
    quantity: i64,
}

/// Repository for persisted carts.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the stored cart of a shop, or an empty cart when none is stored.
    ///
    /// Lines whose product snapshot no longer decodes are dropped with a
    /// warning rather than failing the whole cart.
    pub async fn load(&self, shop_id: &str) -> DbResult<Cart> {
        let updated_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM carts WHERE shop_id = ?1")
                .bind(shop_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(updated_at) = updated_at else {
            debug!(shop_id = %shop_id, "No stored cart");
            return Ok(Cart::new(shop_id));
        };

        let rows: Vec<CartLineRow> = sqlx::query_as(
            r#"
            SELECT product_id, product_json, quantity
            FROM cart_items
            WHERE shop_id = ?1
            ORDER BY position ASC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str::<Product>(&row.product_json) {
                Ok(product) => items.push(CartItem {
                    product,
                    quantity: row.quantity,
                }),
                Err(e) => warn!(
                    shop_id = %shop_id,
                    product_id = %row.product_id,
                    error = %e,
                    "Dropping unreadable cart line"
                ),
            }
        }

        debug!(shop_id = %shop_id, lines = items.len(), "Loaded cart");

        Ok(Cart {
            shop_id: shop_id.to_string(),
            items,
            updated_at,
        })
    }

    /// Replaces the stored copy of `cart` with its current state.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE shop_id = ?1")
            .bind(&cart.shop_id)
            .execute(&mut *tx)
            .await?;

        if cart.is_empty() {
            sqlx::query("DELETE FROM carts WHERE shop_id = ?1")
                .bind(&cart.shop_id)
                .execute(&mut *tx)
                .await?;
        } else {
            // Upsert rather than REPLACE: REPLACE deletes the row first.
            sqlx::query(
                r#"
                INSERT INTO carts (shop_id, updated_at) VALUES (?1, ?2)
                ON CONFLICT(shop_id) DO UPDATE SET updated_at = excluded.updated_at
                "#,
            )
            .bind(&cart.shop_id)
            .bind(cart.updated_at)
            .execute(&mut *tx)
            .await?;

            for (position, item) in cart.items.iter().enumerate() {
                let product_json = serde_json::to_string(&item.product)?;

                sqlx::query(
                    r#"
                    INSERT INTO cart_items (shop_id, product_id, product_json, quantity, position)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(&cart.shop_id)
                .bind(&item.product.id)
                .bind(product_json)
                .bind(item.quantity)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        debug!(
            shop_id = %cart.shop_id,
            lines = cart.line_count(),
            "Saved cart"
        );
        Ok(())
    }

    /// Removes the stored cart of a shop.
    pub async fn clear(&self, shop_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE shop_id = ?1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM carts WHERE shop_id = ?1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(shop_id = %shop_id, "Cleared stored cart");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use velmo_core::{Cart, Product};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(id: &str, price: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "shop_id": "shop-1",
            "name": format!("Produit {id}"),
            "price_sale": price,
            "quantity": 12
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_cart_is_empty() {
        let db = setup().await;
        let cart = db.carts().load("shop-1").await.unwrap();

        assert_eq!(cart.shop_id, "shop-1");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_keeps_order_and_snapshot() {
        let db = setup().await;
        let mut cart = Cart::new("shop-1");
        cart.add_item(&product("b", 5_000), 2).unwrap();
        cart.add_item(&product("a", 1_500), 1).unwrap();
        cart.add_item(&product("c", 250), 4).unwrap();

        db.carts().save(&cart).await.unwrap();
        let loaded = db.carts().load("shop-1").await.unwrap();

        let ids: Vec<_> = loaded.items.iter().map(|i| i.product.id.clone()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(loaded.total_amount(), cart.total_amount());
        assert_eq!(loaded.total_items(), 7);
        assert_eq!(loaded.items[0].product.quantity, Some(12));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_lines() {
        let db = setup().await;
        let mut cart = Cart::new("shop-1");
        cart.add_item(&product("a", 1_000), 1).unwrap();
        cart.add_item(&product("b", 2_000), 1).unwrap();
        db.carts().save(&cart).await.unwrap();

        cart.remove_item("a").unwrap();
        cart.set_quantity("b", 3).unwrap();
        db.carts().save(&cart).await.unwrap();

        let loaded = db.carts().load("shop-1").await.unwrap();
        assert_eq!(loaded.line_count(), 1);
        assert_eq!(loaded.quantity_of("b"), Some(3));
    }

    #[tokio::test]
    async fn test_saving_empty_cart_removes_it() {
        let db = setup().await;
        let mut cart = Cart::new("shop-1");
        cart.add_item(&product("a", 1_000), 1).unwrap();
        db.carts().save(&cart).await.unwrap();

        cart.clear();
        db.carts().save(&cart).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(db.carts().load("shop-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_carts_are_scoped_per_shop() {
        let db = setup().await;
        let mut first = Cart::new("shop-1");
        first.add_item(&product("a", 1_000), 1).unwrap();
        let mut second = Cart::new("shop-2");
        second.add_item(&product("z", 9_000), 2).unwrap();

        db.carts().save(&first).await.unwrap();
        db.carts().save(&second).await.unwrap();
        db.carts().clear("shop-1").await.unwrap();

        assert!(db.carts().load("shop-1").await.unwrap().is_empty());
        assert_eq!(
            db.carts().load("shop-2").await.unwrap().quantity_of("z"),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_unreadable_line_is_dropped() {
        let db = setup().await;
        let mut cart = Cart::new("shop-1");
        cart.add_item(&product("a", 1_000), 1).unwrap();
        db.carts().save(&cart).await.unwrap();

        sqlx::query(
            "INSERT INTO cart_items (shop_id, product_id, product_json, quantity, position)
             VALUES ('shop-1', 'broken', '{not json', 1, 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let loaded = db.carts().load("shop-1").await.unwrap();
        assert_eq!(loaded.line_count(), 1);
        assert_eq!(loaded.quantity_of("a"), Some(1));
    }
}
