//! # Shop Commands
//!
//! Browsing: the storefront page, product detail, favorites and
//! recommendations.
//!
//! ## Storefront Page
//! ```text
//! Boutique Fanta ✔
//! ────────────────
//!   Adresse        Marché Madina, Conakry
//!   WhatsApp       https://wa.me/224622000000
//!
//! Catégories: Épicerie, Boissons
//!
//! ♥ Riz parfumé 25kg          250 000 GNF   Disponible     🔥
//!   └ 3f2a9c1b-...                                   x2 au panier
//! ```

use std::io::Write;

use chrono::Utc;
use tracing::debug;

use velmo_core::catalog::{
    categories, is_trending, recommended, Availability, CatalogQuery, CategoryFilter, ViewCounts,
};
use velmo_core::whatsapp::contact_link;
use velmo_core::{Cart, Product, Shop, ShopEvent, ShopEventType};

use super::{Context, ShopArgs};
use crate::error::{AppError, AppResult};
use crate::terminal::Terminal;

/// `velmo shop <slug>`
pub async fn show<W: Write>(ctx: &Context, term: &mut Terminal<W>, args: ShopArgs) -> AppResult<()> {
    let catalog = ctx.catalog(&args.slug).await?;
    let shop = &catalog.shop;
    let shop_id = shop.id.clone();

    ctx.track(|session| ShopEvent::new(&shop_id, session, ShopEventType::Visit))
        .await;
    let search = args.search.trim().to_string();
    if !search.is_empty() {
        ctx.track(|session| {
            ShopEvent::new(&shop_id, session, ShopEventType::Search).with_search(&search)
        })
        .await;
    }
    if let Some(category) = &args.category {
        ctx.track(|session| {
            ShopEvent::new(&shop_id, session, ShopEventType::CategoryClick)
                .with_category(category)
        })
        .await;
    }

    let prefs = ctx.db.preferences();
    let views = prefs.view_counts().await?;
    let favorites = prefs.favorites().await?;
    let cart = ctx.db.carts().load(&shop.id).await?;

    let query = CatalogQuery {
        search,
        category: args
            .category
            .map_or(CategoryFilter::All, CategoryFilter::Named),
        availability: if args.new {
            Availability::New
        } else if args.available {
            Availability::Available
        } else {
            Availability::All
        },
        sort: args.sort.into(),
    };
    let products = query.apply(&catalog.products, &views, Utc::now());
    debug!(
        shown = products.len(),
        total = catalog.products.len(),
        "Catalog filtered"
    );

    shop_header(ctx, term, shop)?;

    let names = categories(&catalog.products);
    if !names.is_empty() {
        term.line(format!("Catégories: {}", names.join(", ")))?;
        term.blank()?;
    }

    if products.is_empty() {
        term.line("Aucun produit ne correspond.")?;
    }
    for product in products {
        product_row(term, shop, product, &views, &favorites, &cart)?;
    }

    if !cart.is_empty() {
        term.blank()?;
        term.line(format!(
            "Panier: {} article(s), {}",
            cart.total_items(),
            cart.total_amount().price_label(shop.currency_code())
        ))?;
    }

    Ok(())
}

/// `velmo product <slug> <id>`
pub async fn product<W: Write>(
    ctx: &Context,
    term: &mut Terminal<W>,
    slug: &str,
    product_id: &str,
) -> AppResult<()> {
    let catalog = ctx.catalog(slug).await?;
    let product = catalog
        .product(product_id)
        .ok_or_else(|| product_not_found(product_id))?;
    let currency = catalog.shop.currency_code();

    let prefs = ctx.db.preferences();
    let views = prefs.record_view(&product.id).await?;
    let favorite = prefs.is_favorite(&product.id).await?;
    ctx.track(|session| {
        ShopEvent::new(&catalog.shop.id, session, ShopEventType::ViewProduct)
            .with_product(&product.id)
    })
    .await;

    let title = if favorite {
        format!("♥ {}", product.name)
    } else {
        product.name.clone()
    };
    term.heading(&title)?;
    term.field("Prix", Some(product.price_sale.price_label(currency)))?;
    term.field("Stock", Some(product.stock_status().label()))?;
    term.field("Catégorie", product.category.as_deref())?;
    term.field("Unité", product.unit.as_deref())?;
    term.field(
        "Photo",
        product
            .photo_url
            .as_deref()
            .and_then(|p| ctx.backend.public_media_url(p)),
    )?;
    term.field("Vues", Some(views))?;
    if let Some(description) = product.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            term.blank()?;
            term.line(description)?;
        }
    }
    term.blank()?;
    term.line(format!("Réf. produit: {}", product.id))?;

    Ok(())
}

/// `velmo favorite <slug> <id>`
pub async fn favorite<W: Write>(
    ctx: &Context,
    term: &mut Terminal<W>,
    slug: &str,
    product_id: &str,
) -> AppResult<()> {
    let catalog = ctx.catalog(slug).await?;
    let product = catalog
        .product(product_id)
        .ok_or_else(|| product_not_found(product_id))?;

    let now_favorite = ctx.db.preferences().toggle_favorite(&product.id).await?;
    if now_favorite {
        term.line(format!("♥ {} ajouté aux favoris", product.name))?;
    } else {
        term.line(format!("{} retiré des favoris", product.name))?;
    }
    Ok(())
}

/// `velmo recommend <slug>`
pub async fn recommend<W: Write>(
    ctx: &Context,
    term: &mut Terminal<W>,
    slug: &str,
) -> AppResult<()> {
    let catalog = ctx.catalog(slug).await?;
    let prefs = ctx.db.preferences();
    let views = prefs.view_counts().await?;
    let favorites = prefs.favorites().await?;
    let cart = ctx.db.carts().load(&catalog.shop.id).await?;

    let picks = recommended(&catalog.products, &favorites, &views);
    term.heading("Recommandé pour vous")?;
    if picks.is_empty() {
        term.line("Consultez ou aimez des produits pour recevoir des suggestions.")?;
    }
    for product in picks {
        product_row(term, &catalog.shop, product, &views, &favorites, &cart)?;
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn product_not_found(product_id: &str) -> AppError {
    AppError::not_found(format!("Produit introuvable: {product_id}"))
}

fn shop_header<W: Write>(ctx: &Context, term: &mut Terminal<W>, shop: &Shop) -> AppResult<()> {
    let title = if shop.is_verified {
        format!("{} ✔", shop.name)
    } else {
        shop.name.clone()
    };
    term.heading(&title)?;

    if let Some(description) = shop.description.as_deref().map(str::trim) {
        if !description.is_empty() {
            term.line(description)?;
        }
    }
    term.field("Catégorie", shop.category.as_deref())?;
    term.field("Adresse", shop.address.as_deref())?;
    term.field("Horaires", shop.opening_hours.as_deref())?;
    term.field("WhatsApp", contact_link(shop))?;
    term.field("Livraison", shop.delivery_info.as_deref())?;
    term.field("Retours", shop.return_policy.as_deref())?;
    term.field("Logo", shop.logo().and_then(|p| ctx.backend.public_media_url(p)))?;
    term.blank()?;
    Ok(())
}

fn product_row<W: Write>(
    term: &mut Terminal<W>,
    shop: &Shop,
    product: &Product,
    views: &ViewCounts,
    favorites: &[String],
    cart: &Cart,
) -> AppResult<()> {
    term.line(product_line(shop, product, views, favorites))?;

    let in_cart = cart
        .quantity_of(&product.id)
        .map(|qty| format!("   x{qty} au panier"))
        .unwrap_or_default();
    term.line(format!("  └ {}{in_cart}", product.id))
}

/// One catalog row: favorite mark, name, price, stock badge, trending mark.
fn product_line(shop: &Shop, product: &Product, views: &ViewCounts, favorites: &[String]) -> String {
    let heart = if favorites.iter().any(|f| f == &product.id) {
        '♥'
    } else {
        ' '
    };
    let trending = if is_trending(views, &product.id) {
        " 🔥"
    } else {
        ""
    };

    format!(
        "{heart} {:<26} {:>16}   {:<13}{trending}",
        product.name,
        product.price_sale.price_label(shop.currency_code()),
        product.stock_status().label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shop() -> Shop {
        serde_json::from_value(json!({
            "id": "s1", "name": "Boutique Fanta", "slug": "boutique-fanta", "currency": "GNF"
        }))
        .unwrap()
    }

    fn product(price: serde_json::Value, quantity: Option<i64>) -> Product {
        serde_json::from_value(json!({
            "id": "p1", "shop_id": "s1", "name": "Riz parfumé",
            "price_sale": price, "quantity": quantity
        }))
        .unwrap()
    }

    #[test]
    fn test_product_line_marks() {
        let product = product(json!(250000), Some(40));
        let views: ViewCounts = [("p1".to_string(), 4)].into_iter().collect();
        let favorites = vec!["p1".to_string()];

        let line = product_line(&shop(), &product, &views, &favorites);
        assert!(line.starts_with("♥ Riz parfumé"));
        assert!(line.contains("GNF"));
        assert!(line.ends_with(" 🔥"));
    }

    #[test]
    fn test_product_line_without_price() {
        let product = product(json!(null), None);
        let line = product_line(&shop(), &product, &ViewCounts::new(), &[]);

        assert!(line.starts_with("  Riz parfumé"));
        assert!(line.contains("Prix sur demande"));
        assert!(!line.contains('🔥'));
    }

    #[test]
    fn test_product_row_shows_cart_quantity() {
        let product = product(json!(1000), None);
        let mut cart = Cart::new("s1");
        cart.add_item(&product, 2).unwrap();

        let mut term = Terminal::new(Vec::new());
        product_row(&mut term, &shop(), &product, &ViewCounts::new(), &[], &cart).unwrap();

        let out = String::from_utf8(term.into_inner()).unwrap();
        assert!(out.ends_with("  └ p1   x2 au panier\n"));
    }
}
