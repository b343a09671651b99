//! # Catalog Browsing
//!
//! Search, filters, sorting and local recommendations over a shop's loaded
//! product list.
//!
//! ```text
//! products (from backend, ordered by name)
//!      │
//!      ▼
//! search ──► category ──► availability ──► sort ──► grid
//! ```
//!
//! View counts and favorites are local to the shopper's device; they never
//! leave it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Products created within this many days count as new.
pub const NEW_PRODUCT_DAYS: i64 = 7;

/// Maximum number of recommended products.
pub const MAX_RECOMMENDATIONS: usize = 6;

/// A product is flagged as trending after more views than this.
pub const TRENDING_VIEW_THRESHOLD: u32 = 3;

const FAVORITE_SCORE: u32 = 100;
const VIEW_SCORE: u32 = 10;

/// Local view counters, keyed by product id.
pub type ViewCounts = HashMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    All,
    /// Active products only.
    Available,
    /// Created within the last [`NEW_PRODUCT_DAYS`] days.
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Backend order (by name).
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Name,
    /// Most viewed on this device first.
    Popular,
}

/// The shopper's current catalog filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub availability: Availability,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Filters and sorts `products`. `now` anchors the "new" filter.
    pub fn apply<'a>(
        &self,
        products: &'a [Product],
        views: &ViewCounts,
        now: DateTime<Utc>,
    ) -> Vec<&'a Product> {
        let needle = self.search.trim().to_lowercase();
        let new_since = now - Duration::days(NEW_PRODUCT_DAYS);

        let mut result: Vec<&Product> = products
            .iter()
            .filter(|p| matches_search(p, &needle))
            .filter(|p| match &self.category {
                CategoryFilter::All => true,
                CategoryFilter::Named(name) => p.category.as_deref() == Some(name.as_str()),
            })
            .filter(|p| match self.availability {
                Availability::All => true,
                Availability::Available => p.is_active,
                Availability::New => p.created_at.is_some_and(|c| c > new_since),
            })
            .collect();

        // Vec::sort_by is stable, so ties keep backend order.
        match self.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => result.sort_by_key(|p| p.price_sale),
            SortOrder::PriceDesc => result.sort_by(|a, b| b.price_sale.cmp(&a.price_sale)),
            SortOrder::Name => {
                result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }
            SortOrder::Popular => result.sort_by(|a, b| {
                let va = views.get(&a.id).copied().unwrap_or(0);
                let vb = views.get(&b.id).copied().unwrap_or(0);
                vb.cmp(&va)
            }),
        }

        result
    }
}

fn matches_search(product: &Product, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Distinct non-empty categories, in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_string()))
        .map(str::to_string)
        .collect()
}

/// Products the shopper is likely to want, from local signals only.
///
/// score = 100 if favorite + 10 × views; zero scores are dropped.
pub fn recommended<'a>(
    products: &'a [Product],
    favorites: &[String],
    views: &ViewCounts,
) -> Vec<&'a Product> {
    let mut scored: Vec<(u32, &Product)> = products
        .iter()
        .map(|p| {
            // View counts come from a local file and are unbounded.
            let mut score = views
                .get(&p.id)
                .copied()
                .unwrap_or(0)
                .saturating_mul(VIEW_SCORE);
            if favorites.iter().any(|f| f == &p.id) {
                score = score.saturating_add(FAVORITE_SCORE);
            }
            (score, p)
        })
        .filter(|(score, _)| *score > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(_, p)| p)
        .collect()
}

/// Whether a product gets the trending badge.
pub fn is_trending(views: &ViewCounts, product_id: &str) -> bool {
    views.get(product_id).copied().unwrap_or(0) > TRENDING_VIEW_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::fixtures::product;

    fn catalog() -> Vec<Product> {
        let mut rice = product("rice", 250_000);
        rice.name = "Riz parfumé".to_string();
        rice.category = Some("Alimentation".to_string());
        rice.description = Some("Sac de 25kg".to_string());

        let mut soap = product("soap", 5_000);
        soap.name = "Savon".to_string();
        soap.category = Some("Hygiène".to_string());

        let mut oil = product("oil", 45_000);
        oil.name = "huile".to_string();
        oil.category = Some("Alimentation".to_string());
        oil.is_active = false;

        vec![rice, soap, oil]
    }

    fn now() -> DateTime<Utc> {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_categories_distinct_in_order() {
        let mut products = catalog();
        products[1].category = Some("  ".to_string());
        assert_eq!(categories(&products), vec!["Alimentation".to_string()]);
        assert_eq!(categories(&catalog()), vec!["Alimentation", "Hygiène"]);
    }

    #[test]
    fn test_search_matches_name_or_description() {
        let products = catalog();
        let views = ViewCounts::new();

        let q = CatalogQuery {
            search: "SAVON".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = q.apply(&products, &views, now()).iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["soap"]);

        let q = CatalogQuery {
            search: "25kg".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = q.apply(&products, &views, now()).iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["rice"]);
    }

    #[test]
    fn test_category_and_availability() {
        let products = catalog();
        let q = CatalogQuery {
            category: CategoryFilter::Named("Alimentation".to_string()),
            availability: Availability::Available,
            ..Default::default()
        };
        let ids: Vec<_> = q
            .apply(&products, &ViewCounts::new(), now())
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids, vec!["rice"]);
    }

    #[test]
    fn test_new_filter_uses_seven_days() {
        let mut products = catalog();
        products[0].created_at = Some(now() - Duration::days(2));
        products[1].created_at = Some(now() - Duration::days(8));

        let q = CatalogQuery {
            availability: Availability::New,
            ..Default::default()
        };
        let ids: Vec<_> = q
            .apply(&products, &ViewCounts::new(), now())
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids, vec!["rice"]);
    }

    #[test]
    fn test_sorting() {
        let mut products = catalog();
        products.push(Product {
            price_sale: Money::zero(),
            ..product("free", 0)
        });
        let views: ViewCounts = [("soap".to_string(), 4), ("oil".to_string(), 9)].into();

        let ids = |sort| {
            CatalogQuery {
                sort,
                ..Default::default()
            }
            .apply(&products, &views, now())
            .iter()
            .map(|p| p.id.clone())
            .collect::<Vec<_>>()
        };

        assert_eq!(ids(SortOrder::PriceAsc), vec!["free", "soap", "oil", "rice"]);
        assert_eq!(ids(SortOrder::PriceDesc), vec!["rice", "oil", "soap", "free"]);
        assert_eq!(ids(SortOrder::Name), vec!["oil", "free", "rice", "soap"]);
        assert_eq!(ids(SortOrder::Popular), vec!["oil", "soap", "rice", "free"]);
        assert_eq!(ids(SortOrder::Default), vec!["rice", "soap", "oil", "free"]);
    }

    #[test]
    fn test_recommendations_score_and_limit() {
        let products: Vec<Product> = (0..10).map(|i| product(&i.to_string(), 100)).collect();
        let favorites = vec!["9".to_string()];
        let views: ViewCounts = (0..8).map(|i| (i.to_string(), i as u32)).collect();

        let recs: Vec<_> = recommended(&products, &favorites, &views)
            .iter()
            .map(|p| p.id.clone())
            .collect();

        // "9" is a favorite (100), then views 7,6,5,4,3 (70..30). "0" has no score.
        assert_eq!(recs, vec!["9", "7", "6", "5", "4", "3"]);
    }

    #[test]
    fn test_huge_view_counts_rank_first() {
        let products = vec![product("viral", 100), product("steady", 100)];
        let favorites = vec!["viral".to_string()];
        let views: ViewCounts =
            [("viral".to_string(), u32::MAX), ("steady".to_string(), 1_000)].into();

        let recs: Vec<_> = recommended(&products, &favorites, &views)
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(recs, vec!["viral", "steady"]);
    }

    #[test]
    fn test_trending_threshold() {
        let views: ViewCounts = [("a".to_string(), 3), ("b".to_string(), 4)].into();
        assert!(!is_trending(&views, "a"));
        assert!(is_trending(&views, "b"));
        assert!(!is_trending(&views, "c"));
    }
}
