//! # Order Commands
//!
//! `checkout` sends the cart, `receipt` prints a ticket, `track` shows the
//! last order placed from this device.

use std::io::Write;

use serde_json::json;
use tracing::warn;

use velmo_core::receipt::{receipt_url, ReceiptTicket, ReceiptWidth};
use velmo_core::validation::validate_order_reference;
use velmo_core::{
    CheckoutForm, CustomerInfo, DeliveryMethod, GeoLocation, ShopEvent, ShopEventType,
};

use super::{CheckoutArgs, Context};
use crate::checkout::{Checkout, CheckoutOutcome};
use crate::error::{AppError, AppResult};
use crate::terminal::Terminal;

/// `velmo checkout <slug> ...`
pub async fn checkout<W: Write>(
    ctx: &Context,
    term: &mut Terminal<W>,
    args: CheckoutArgs,
) -> AppResult<()> {
    let shop = ctx.shop(&args.slug).await?;
    let mut cart = ctx.db.carts().load(&shop.id).await?;
    let saved = ctx.db.preferences().customer_info().await?;
    let form = checkout_form(args, saved);

    if !cart.is_empty() {
        ctx.track(|session| ShopEvent::new(&shop.id, session, ShopEventType::CheckoutStart))
            .await;
    }

    let checkout = Checkout::new(
        ctx.backend.clone(),
        ctx.db.clone(),
        ctx.config.public_url(),
    );
    let total = cart.total_amount();

    match checkout.submit(&shop, &mut cart, &form).await? {
        CheckoutOutcome::EmptyCart => term.line("Votre panier est vide."),
        CheckoutOutcome::Placed(placed) => {
            ctx.track(|session| {
                ShopEvent::new(&shop.id, session, ShopEventType::CheckoutSuccess).with_metadata(
                    json!({ "order_id": placed.receipt.id, "total": total.units() }),
                )
            })
            .await;

            term.heading("Commande envoyée ✅")?;
            term.field("Référence", Some(placed.receipt.reference()))?;
            term.field("Total", Some(total.price_label(shop.currency_code())))?;
            term.field("Reçu", Some(&placed.receipt_url))?;
            term.blank()?;
            match &placed.whatsapp_link {
                Some(link) => {
                    term.line("Confirmez votre commande au vendeur sur WhatsApp :")?;
                    term.line(link)
                }
                None => term.line("Cette boutique n'a pas de numéro WhatsApp."),
            }
        }
    }
}

/// Merges command-line values over the details saved last time.
fn checkout_form(args: CheckoutArgs, saved: Option<CustomerInfo>) -> CheckoutForm {
    let saved = saved.unwrap_or_default();
    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(GeoLocation { lat, lng }),
        _ => None,
    };

    CheckoutForm {
        customer: CustomerInfo {
            name: args.name.unwrap_or(saved.name),
            phone: args.phone.unwrap_or(saved.phone),
            address: args.address.or(saved.address),
            location: location.or(saved.location),
        },
        delivery_method: if args.delivery {
            DeliveryMethod::Delivery
        } else {
            DeliveryMethod::Pickup
        },
        note: args.note,
    }
}

/// `velmo receipt [<ref>] [--width N]`
pub async fn receipt<W: Write>(
    ctx: &Context,
    term: &mut Terminal<W>,
    reference: Option<&str>,
    width: Option<usize>,
) -> AppResult<()> {
    let width = match width {
        Some(columns) => ReceiptWidth::try_from(columns)?,
        None => ctx.config.receipt_width(),
    };

    let reference = match reference {
        Some(reference) => reference.to_string(),
        None => last_order_ref(ctx).await?,
    };
    let reference = validate_order_reference(&reference)?;

    let (order, shop) = ctx
        .backend
        .order_with_shop(&reference)
        .await
        .map_err(|e| match e {
            velmo_backend::BackendError::NotFound(_) => {
                AppError::not_found("Commande introuvable")
            }
            other => other.into(),
        })?;

    let ticket = ReceiptTicket::render(&order, shop.as_ref(), width);
    for line in &ticket.lines {
        term.line(line)?;
    }
    term.blank()?;
    term.line(receipt_url(ctx.config.public_url(), &order.id))
}

/// `velmo track`
pub async fn track<W: Write>(ctx: &Context, term: &mut Terminal<W>) -> AppResult<()> {
    let reference = last_order_ref(ctx).await?;
    term.field("Dernière commande", Some(&reference))?;

    let parsed = validate_order_reference(&reference)?;
    match ctx.backend.order_by_reference(&parsed).await {
        Ok(order) => term.field("Statut", Some(order.status.label())),
        Err(e) => {
            warn!(reference = %reference, error = %e, "Order status unavailable");
            term.field("Statut", Some("indisponible"))
        }
    }
}

async fn last_order_ref(ctx: &Context) -> AppResult<String> {
    ctx.db
        .preferences()
        .last_order_ref()
        .await?
        .ok_or_else(|| AppError::not_found("Aucune commande passée depuis cet appareil"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CheckoutArgs {
        CheckoutArgs {
            slug: "boutique-fanta".to_string(),
            name: None,
            phone: None,
            address: None,
            delivery: false,
            note: None,
            lat: None,
            lng: None,
        }
    }

    fn saved() -> CustomerInfo {
        CustomerInfo {
            name: "Mariama".to_string(),
            phone: "622 11 22 33".to_string(),
            address: Some("Ratoma".to_string()),
            location: Some(GeoLocation {
                lat: 9.6,
                lng: -13.6,
            }),
        }
    }

    #[test]
    fn test_form_falls_back_to_saved_details() {
        let form = checkout_form(args(), Some(saved()));

        assert_eq!(form.customer.name, "Mariama");
        assert_eq!(form.customer.address.as_deref(), Some("Ratoma"));
        assert_eq!(form.delivery_method, DeliveryMethod::Pickup);
    }

    #[test]
    fn test_arguments_win_over_saved_details() {
        let mut args = args();
        args.name = Some("Ibrahima".to_string());
        args.delivery = true;
        args.lat = Some(9.5);
        args.lng = Some(-13.7);

        let form = checkout_form(args, Some(saved()));

        assert_eq!(form.customer.name, "Ibrahima");
        assert_eq!(form.customer.phone, "622 11 22 33");
        assert_eq!(form.customer.location, Some(GeoLocation { lat: 9.5, lng: -13.7 }));
        assert_eq!(form.delivery_method, DeliveryMethod::Delivery);
    }

    #[test]
    fn test_no_saved_details() {
        let form = checkout_form(args(), None);
        assert!(form.customer.name.is_empty());
        assert!(form.validate().is_err());
    }
}
