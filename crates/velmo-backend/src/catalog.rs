//! # Catalog Queries
//!
//! Public shop lookup and the shop's visible product list.
//!
//! ```text
//! GET /rest/v1/shops?slug=ilike.<slug>&is_public=eq.true        (one object)
//! GET /rest/v1/products?shop_id=eq.<id>&is_active=eq.true
//!                      &is_visible=eq.true&order=name.asc       (rows)
//! ```

use tracing::{debug, info};

use crate::client::BackendClient;
use crate::error::BackendResult;
use velmo_core::{Product, Shop};

const SHOPS: &str = "shops";
const PRODUCTS: &str = "products";

/// A public shop together with its orderable catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub shop: Shop,
    /// Sorted by name, as the backend returns them.
    pub products: Vec<Product>,
}

impl Catalog {
    /// Looks up a product of this catalog.
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}

impl BackendClient {
    /// Finds a public shop by slug, case-insensitively.
    ///
    /// Private and unknown shops both give
    /// [`BackendError::NotFound`](crate::BackendError::NotFound).
    pub async fn shop_by_slug(&self, slug: &str) -> BackendResult<Shop> {
        let slug_filter = format!("ilike.{slug}");
        let shop: Shop = self
            .get_object(SHOPS, &[("slug", slug_filter.as_str()), ("is_public", "eq.true")])
            .await?;

        debug!(slug = %slug, shop_id = %shop.id, "Shop found");
        Ok(shop)
    }

    /// Loads a shop by id, public or not. Used for receipts.
    pub async fn shop_by_id(&self, shop_id: &str) -> BackendResult<Shop> {
        let id_filter = format!("eq.{shop_id}");
        self.get_object(SHOPS, &[("id", id_filter.as_str())]).await
    }

    /// Active, visible products of a shop, sorted by name.
    pub async fn products_for_shop(&self, shop_id: &str) -> BackendResult<Vec<Product>> {
        let shop_filter = format!("eq.{shop_id}");
        let products: Vec<Product> = self
            .get_rows(
                PRODUCTS,
                &[
                    ("shop_id", shop_filter.as_str()),
                    ("is_active", "eq.true"),
                    ("is_visible", "eq.true"),
                    ("order", "name.asc"),
                ],
            )
            .await?;

        debug!(shop_id = %shop_id, count = products.len(), "Products loaded");
        Ok(products)
    }

    /// Shop and products for a storefront page.
    pub async fn load_catalog(&self, slug: &str) -> BackendResult<Catalog> {
        let shop = self.shop_by_slug(slug).await?;
        let products = self.products_for_shop(&shop.id).await?;

        info!(
            shop = %shop.name,
            products = products.len(),
            "Catalog loaded"
        );

        Ok(Catalog { shop, products })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shop_row_decodes() {
        let body = json!({
            "id": "8b1d6e2a-0f3c-4c57-9a52-1f0d3b7e6c11",
            "name": "Boutique Fanta",
            "slug": "boutique-fanta",
            "is_public": true,
            "whatsapp": "+224 622 00 00 00",
            "currency": "GNF",
            "created_at": "2026-01-12T09:30:00+00:00"
        })
        .to_string();

        let shop: Shop = crate::client::decode(&body).unwrap();
        assert_eq!(shop.slug, "boutique-fanta");
        assert!(shop.is_public);
        assert_eq!(shop.currency_code(), "GNF");
    }

    #[test]
    fn test_product_rows_decode_with_bad_prices() {
        let body = json!([
            { "id": "p1", "shop_id": "s1", "name": "Riz 25kg", "price_sale": 250000 },
            { "id": "p2", "shop_id": "s1", "name": "Huile", "price_sale": null },
            { "id": "p3", "shop_id": "s1", "name": "Sucre", "price_sale": "abc" }
        ])
        .to_string();

        let products: Vec<Product> = crate::client::decode(&body).unwrap();
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].price_sale.units(), 250_000);
        assert!(products[1].price_sale.is_zero());
        assert!(products[2].price_sale.is_zero());
    }

    #[test]
    fn test_catalog_product_lookup() {
        let products: Vec<Product> = crate::client::decode(
            &json!([{ "id": "p1", "shop_id": "s1", "name": "Riz", "price_sale": 100 }])
                .to_string(),
        )
        .unwrap();
        let shop: Shop = crate::client::decode(
            &json!({ "id": "s1", "name": "B", "slug": "b" }).to_string(),
        )
        .unwrap();

        let catalog = Catalog { shop, products };
        assert!(catalog.product("p1").is_some());
        assert!(catalog.product("nope").is_none());
    }
}
