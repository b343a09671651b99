//! # Preferences Repository
//!
//! Small pieces of shopper state kept on the device:
//!
//! | Data               | Table           | Used for                         |
//! |--------------------|-----------------|----------------------------------|
//! | Customer details   | `customer_info` | Pre-filling the checkout form    |
//! | Favorites          | `favorites`     | Hearts, recommendations          |
//! | View counters      | `product_views` | "Popular" sort, trending badge   |
//! | Last order ref     | `app_state`     | `velmo track`, default receipt   |
//! | Session id         | `app_state`     | Anonymous analytics events       |

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use velmo_core::catalog::ViewCounts;
use velmo_core::{CustomerInfo, GeoLocation};

const LAST_ORDER_REF_KEY: &str = "last_order_ref";
const SESSION_ID_KEY: &str = "session_id";

#[derive(Debug, sqlx::FromRow)]
struct CustomerInfoRow {
    name: String,
    phone: String,
    address: Option<String>,
    location_lat: Option<f64>,
    location_lng: Option<f64>,
}

impl From<CustomerInfoRow> for CustomerInfo {
    fn from(row: CustomerInfoRow) -> Self {
        let location = match (row.location_lat, row.location_lng) {
            (Some(lat), Some(lng)) => Some(GeoLocation { lat, lng }),
            _ => None,
        };
        CustomerInfo {
            name: row.name,
            phone: row.phone,
            address: row.address,
            location,
        }
    }
}

/// Repository for on-device shopper preferences.
#[derive(Debug, Clone)]
pub struct PreferencesRepository {
    pool: SqlitePool,
}

impl PreferencesRepository {
    /// Creates a new PreferencesRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PreferencesRepository { pool }
    }

    // =========================================================================
    // Customer details
    // =========================================================================

    /// Details entered at the last checkout, if any.
    pub async fn customer_info(&self) -> DbResult<Option<CustomerInfo>> {
        let row: Option<CustomerInfoRow> = sqlx::query_as(
            r#"
            SELECT name, phone, address, location_lat, location_lng
            FROM customer_info
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomerInfo::from))
    }

    /// Remembers the shopper's details for the next checkout.
    pub async fn save_customer_info(&self, info: &CustomerInfo) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customer_info (id, name, phone, address, location_lat, location_lng, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                address = excluded.address,
                location_lat = excluded.location_lat,
                location_lng = excluded.location_lng,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&info.name)
        .bind(&info.phone)
        .bind(&info.address)
        .bind(info.location.map(|l| l.lat))
        .bind(info.location.map(|l| l.lng))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!("Saved customer info");
        Ok(())
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Favorite product ids, oldest first.
    pub async fn favorites(&self) -> DbResult<Vec<String>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT product_id FROM favorites ORDER BY created_at, rowid")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    pub async fn is_favorite(&self, product_id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM favorites WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Adds or removes a favorite. Returns whether it is now a favorite.
    pub async fn toggle_favorite(&self, product_id: &str) -> DbResult<bool> {
        let removed = sqlx::query("DELETE FROM favorites WHERE product_id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            debug!(product_id = %product_id, "Favorite removed");
            return Ok(false);
        }

        sqlx::query("INSERT INTO favorites (product_id, created_at) VALUES (?1, ?2)")
            .bind(product_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(product_id = %product_id, "Favorite added");
        Ok(true)
    }

    // =========================================================================
    // View counters
    // =========================================================================

    /// Counts one more view of a product. Returns the new count.
    pub async fn record_view(&self, product_id: &str) -> DbResult<u32> {
        let views: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO product_views (product_id, views, last_viewed_at)
            VALUES (?1, 1, ?2)
            ON CONFLICT(product_id) DO UPDATE SET
                views = views + 1,
                last_viewed_at = excluded.last_viewed_at
            RETURNING views
            "#,
        )
        .bind(product_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(views).unwrap_or(u32::MAX))
    }

    /// All view counters, keyed by product id.
    pub async fn view_counts(&self) -> DbResult<ViewCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT product_id, views FROM product_views")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, views)| (id, u32::try_from(views).unwrap_or(u32::MAX)))
            .collect())
    }

    // =========================================================================
    // App state
    // =========================================================================

    /// Reference of the last order placed from this device.
    pub async fn last_order_ref(&self) -> DbResult<Option<String>> {
        self.get_state(LAST_ORDER_REF_KEY).await
    }

    pub async fn set_last_order_ref(&self, reference: &str) -> DbResult<()> {
        self.set_state(LAST_ORDER_REF_KEY, reference).await
    }

    /// Anonymous id grouping this device's analytics events.
    /// Created on first use.
    pub async fn session_id(&self) -> DbResult<String> {
        if let Some(id) = self.get_state(SESSION_ID_KEY).await? {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        self.set_state(SESSION_ID_KEY, &id).await?;
        debug!(session_id = %id, "Created analytics session");
        Ok(id)
    }

    async fn get_state(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM app_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_state(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app_state (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
