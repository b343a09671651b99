//! # WhatsApp Hand-off
//!
//! Merchants receive orders on WhatsApp. After an order is stored, the
//! shopper opens a `wa.me` link whose text is the order summary below.
//!
//! ```text
//! 📦 *NOUVELLE COMMANDE VELMO*
//!
//! 🏪 *Boutique:* Boutique Kaloum
//! 🆔 *Réf:* #3F2A9C1B
//!
//! 👤 *Client:* Mamadou
//! 📱 *Téléphone:* 622 00 12 34
//!
//! 🛒 *Produits:*
//! • Riz 25kg x2 = 500 000 GNF
//!
//! 💰 *TOTAL:* 500 000 GNF
//!
//! 📍 *Mode:* Retrait en boutique
//!
//! 📄 *Voir le reçu :* https://velmo.app/receipt/3f2a9c1b-...
//!
//! ---
//! ✅ Envoyé via Velmo
//! ```

use std::fmt::Write;

use crate::money::Money;
use crate::order::CheckoutForm;
use crate::types::{short_id, OrderItem, Shop};

const WA_BASE: &str = "https://wa.me";

/// Builds the order summary sent to the merchant.
///
/// `order_id` is the stored order's id; its first 8 characters become the
/// reference line. Optional lines (reference, address, GPS, note, receipt)
/// are left out when there is nothing to show.
pub fn order_message(
    shop: &Shop,
    lines: &[OrderItem],
    total: Money,
    form: &CheckoutForm,
    order_id: Option<&str>,
    receipt_url: Option<&str>,
) -> String {
    let currency = shop.currency_code();
    let mut msg = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(msg, "📦 *NOUVELLE COMMANDE VELMO*");
    let _ = writeln!(msg);
    let _ = writeln!(msg, "🏪 *Boutique:* {}", shop.name);
    if let Some(id) = order_id {
        let _ = writeln!(msg, "🆔 *Réf:* #{}", short_id(id));
    }
    let _ = writeln!(msg);

    let _ = writeln!(msg, "👤 *Client:* {}", form.customer.name.trim());
    let _ = writeln!(msg, "📱 *Téléphone:* {}", form.customer.phone.trim());
    if let Some(address) = form.address() {
        let _ = writeln!(msg, "🏠 *Adresse:* {address}");
    }
    if let Some(location) = form.customer.location {
        let _ = writeln!(msg, "📍 *Position GPS:* {}", location.maps_url());
    }
    let _ = writeln!(msg);

    let _ = writeln!(msg, "🛒 *Produits:*");
    for line in lines {
        let _ = writeln!(
            msg,
            "• {} x{} = {}",
            line.name,
            line.quantity,
            line.line_total().price_label(currency)
        );
    }
    let _ = writeln!(msg);

    let _ = writeln!(msg, "💰 *TOTAL:* {}", total.price_label(currency));
    let _ = writeln!(msg);
    let _ = writeln!(msg, "📍 *Mode:* {}", form.delivery_method.label());

    if let Some(note) = form.note() {
        let _ = writeln!(msg);
        let _ = writeln!(msg, "💬 *Note:* {note}");
    }

    if let Some(url) = receipt_url {
        let _ = writeln!(msg);
        let _ = writeln!(msg, "📄 *Voir le reçu :* {url}");
    }

    let _ = writeln!(msg);
    let _ = writeln!(msg, "---");
    msg.push_str("✅ Envoyé via Velmo");
    msg
}

/// `https://wa.me/<digits>?text=<message>`.
///
/// Non-digits are stripped from `phone`. With no digits left the link opens
/// WhatsApp's contact picker.
pub fn deep_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("{WA_BASE}/{digits}?text={}", urlencoding::encode(message))
}

/// Plain chat link to the shop, `None` when it has no number.
pub fn contact_link(shop: &Shop) -> Option<String> {
    shop.whatsapp_number()
        .map(|digits| format!("{WA_BASE}/{digits}"))
}
