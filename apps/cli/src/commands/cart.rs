//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Placed  │       │
//! │  │  Cart    │     │          │     │          │     │  (empty) │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   add / inc / dec / set / remove                        │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear ──────────────────────► (back to empty)         │
//! │                                                                         │
//! │  Every change is saved before the command returns, so the next          │
//! │  invocation sees it.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;

use tracing::debug;

use velmo_core::{Cart, CartTotals, Shop, ShopEvent, ShopEventType};

use super::{CartAction, Context};
use crate::error::{AppError, AppResult};
use crate::terminal::Terminal;

/// `velmo cart <action>`
pub async fn run<W: Write>(
    ctx: &Context,
    term: &mut Terminal<W>,
    action: CartAction,
) -> AppResult<()> {
    match action {
        CartAction::Show { slug } => {
            let shop = ctx.shop(&slug).await?;
            let cart = ctx.db.carts().load(&shop.id).await?;
            render_cart(term, &shop, &cart)
        }

        CartAction::Add {
            slug,
            product_id,
            qty,
        } => {
            let catalog = ctx.catalog(&slug).await?;
            let product = catalog
                .product(&product_id)
                .ok_or_else(|| AppError::not_found(format!("Produit introuvable: {product_id}")))?;

            let mut cart = ctx.db.carts().load(&catalog.shop.id).await?;
            cart.add_item(product, qty)?;
            ctx.db.carts().save(&cart).await?;

            ctx.track(|session| {
                ShopEvent::new(&catalog.shop.id, session, ShopEventType::AddToCart)
                    .with_product(&product.id)
            })
            .await;

            term.line(format!("+ {} x{qty}", product.name))?;
            summary(term, &catalog.shop, &cart)
        }

        CartAction::Inc { slug, product_id } => {
            update(ctx, term, &slug, |cart| cart.adjust_quantity(&product_id, 1)).await
        }

        CartAction::Dec { slug, product_id } => {
            update(ctx, term, &slug, |cart| cart.adjust_quantity(&product_id, -1)).await
        }

        CartAction::Set {
            slug,
            product_id,
            qty,
        } => update(ctx, term, &slug, |cart| cart.set_quantity(&product_id, qty)).await,

        CartAction::Remove { slug, product_id } => {
            update(ctx, term, &slug, |cart| {
                cart.remove_item(&product_id).map(|()| 0)
            })
            .await
        }

        CartAction::Clear { slug } => {
            let shop = ctx.shop(&slug).await?;
            ctx.db.carts().clear(&shop.id).await?;
            term.line("Panier vidé")
        }
    }
}

/// Loads the stored cart, applies `change`, saves, and reports the result.
///
/// `change` returns the line's new quantity; nothing is saved when it fails.
async fn update<W, F>(ctx: &Context, term: &mut Terminal<W>, slug: &str, change: F) -> AppResult<()>
where
    W: Write,
    F: FnOnce(&mut Cart) -> velmo_core::CoreResult<i64>,
{
    let shop = ctx.shop(slug).await?;
    let mut cart = ctx.db.carts().load(&shop.id).await?;

    let quantity = change(&mut cart)?;
    ctx.db.carts().save(&cart).await?;
    debug!(shop_id = %shop.id, quantity, "Cart updated");

    if quantity == 0 {
        term.line("Article retiré")?;
    }
    summary(term, &shop, &cart)
}

fn summary<W: Write>(term: &mut Terminal<W>, shop: &Shop, cart: &Cart) -> AppResult<()> {
    let totals = CartTotals::from(cart);
    term.line(format!(
        "Panier: {} article(s), {}",
        totals.total_items,
        totals.total_amount.price_label(shop.currency_code())
    ))
}

/// Full cart listing.
fn render_cart<W: Write>(term: &mut Terminal<W>, shop: &Shop, cart: &Cart) -> AppResult<()> {
    term.heading(&format!("Panier · {}", shop.name))?;

    if cart.is_empty() {
        return term.line("Votre panier est vide.");
    }

    let currency = shop.currency_code();
    for item in &cart.items {
        term.line(format!(
            "{:>3} x {:<26} {:>16}",
            item.quantity,
            item.product.name,
            item.line_total().price_label(currency)
        ))?;
        term.line(format!("        └ {}", item.product.id))?;
    }
    term.blank()?;
    term.line(format!(
        "{:<32} {:>16}",
        "TOTAL",
        cart.total_amount().price_label(currency)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use velmo_core::Product;

    fn shop() -> Shop {
        serde_json::from_value(json!({ "id": "s1", "name": "Boutique Fanta", "slug": "b" }))
            .unwrap()
    }

    fn product(id: &str, price: i64) -> Product {
        serde_json::from_value(json!({
            "id": id, "shop_id": "s1", "name": format!("Produit {id}"), "price_sale": price
        }))
        .unwrap()
    }

    fn rendered(cart: &Cart) -> String {
        let mut term = Terminal::new(Vec::new());
        render_cart(&mut term, &shop(), cart).unwrap();
        String::from_utf8(term.into_inner()).unwrap()
    }

    #[test]
    fn test_empty_cart() {
        let out = rendered(&Cart::new("s1"));
        assert!(out.ends_with("Votre panier est vide.\n"));
    }

    #[test]
    fn test_cart_listing() {
        let mut cart = Cart::new("s1");
        cart.add_item(&product("a", 5_000), 2).unwrap();
        cart.add_item(&product("b", 1_500), 1).unwrap();

        let out = rendered(&cart);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Panier · Boutique Fanta");
        assert!(lines[2].starts_with("  2 x Produit a"));
        assert_eq!(lines[3], "        └ a");
        assert!(lines[4].starts_with("  1 x Produit b"));
        assert!(lines.last().unwrap().starts_with("TOTAL"));
    }

    #[test]
    fn test_summary_counts_items() {
        let mut cart = Cart::new("s1");
        cart.add_item(&product("a", 100), 3).unwrap();

        let mut term = Terminal::new(Vec::new());
        summary(&mut term, &shop(), &cart).unwrap();
        let out = String::from_utf8(term.into_inner()).unwrap();
        assert!(out.starts_with("Panier: 3 article(s), "));
    }
}
