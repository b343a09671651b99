//! # Receipt Ticket
//!
//! Renders a stored order as a fixed-width text ticket, the way a thermal
//! printer would print it.
//!
//! ## Layout (32 columns)
//! ```text
//! ┌────────────────────────────────┐
//! │        Boutique Kaloum         │  shop header
//! │       +224 622 00 12 34        │
//! │================================│
//! │Ref: #VLM-4821                  │  reference + date
//! │Date: 9 mars 2026 14:05         │
//! │--------------------------------│
//! │      Commande En attente       │  status banner
//! │--------------------------------│
//! │Client: Mamadou                 │  customer block
//! │Tel: 622 00 12 34               │
//! │Mode: Retrait en boutique       │
//! │--------------------------------│
//! │Riz 25kg                        │  item lines
//! │  2 x 250 000        500 000 GNF│
//! │--------------------------------│
//! │Sous-total           500 000 GNF│  totals
//! │TOTAL                500 000 GNF│
//! │================================│
//! │  Merci pour votre confiance !  │
//! └────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::ValidationError;
use crate::types::{CustomerOrder, Shop};
use crate::DEFAULT_CURRENCY;

/// Shop name used when the order's shop could not be loaded.
pub const FALLBACK_SHOP_NAME: &str = "Boutique Velmo";

const DELIVERY_FEE_LABEL: &str = "A définir avec le vendeur";
const THANKS: &str = "Merci pour votre confiance !";

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

// =============================================================================
// Paper Width
// =============================================================================

/// Printable columns of common thermal paper rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiptWidth {
    /// 58 mm roll.
    Narrow,
    /// 80 mm roll, condensed font.
    #[default]
    Standard,
    /// 80 mm roll.
    Wide,
}

impl ReceiptWidth {
    pub const fn columns(&self) -> usize {
        match self {
            ReceiptWidth::Narrow => 32,
            ReceiptWidth::Standard => 42,
            ReceiptWidth::Wide => 48,
        }
    }
}

impl TryFrom<usize> for ReceiptWidth {
    type Error = ValidationError;

    fn try_from(columns: usize) -> Result<Self, Self::Error> {
        match columns {
            32 => Ok(ReceiptWidth::Narrow),
            42 => Ok(ReceiptWidth::Standard),
            48 => Ok(ReceiptWidth::Wide),
            _ => Err(ValidationError::invalid_format(
                "receipt_width",
                "must be 32, 42 or 48 columns",
            )),
        }
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A rendered receipt, one string per printed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptTicket {
    pub width: ReceiptWidth,
    pub lines: Vec<String>,
}

impl ReceiptTicket {
    /// Lays out `order` for printing. `shop` is `None` when it could not be
    /// loaded; the ticket then carries a generic header.
    pub fn render(order: &CustomerOrder, shop: Option<&Shop>, width: ReceiptWidth) -> Self {
        let mut t = TicketWriter::new(width.columns());
        let currency = shop.map_or(DEFAULT_CURRENCY, Shop::currency_code);

        // Header
        let shop_name = shop.map_or(FALLBACK_SHOP_NAME, |s| s.name.as_str());
        t.centered(shop_name);
        if let Some(s) = shop {
            if let Some(phone) = s.contact_phone() {
                t.centered(phone);
            }
            if let Some(address) = s.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
                t.centered(address);
            }
        }
        t.rule('=');

        t.text(&format!("Ref: #{}", order.reference()));
        if let Some(created_at) = order.created_at {
            t.text(&format!("Date: {}", format_date_fr(created_at)));
        }
        t.rule('-');
        t.centered(&format!("Commande {}", order.status.label()));
        t.rule('-');

        // Customer
        t.text(&format!("Client: {}", order.customer_name));
        t.text(&format!("Tel: {}", order.customer_phone));
        t.text(&format!("Mode: {}", order.delivery_method.label()));
        if order.delivery_method.is_delivery() {
            let address = order
                .customer_address
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or("Non précisée");
            t.text(&format!("Adresse: {address}"));
            if let Some(location) = order.customer_location {
                t.text(&format!("GPS: {}", location.maps_url()));
            }
        }
        t.rule('-');

        // Items
        for item in &order.items_json {
            t.text(&item.name);
            t.columns(
                &format!("  {} x {}", item.quantity, item.price),
                &item.line_total().format_amount(currency),
            );
        }
        if order.items_json.is_empty() {
            t.text("(aucun article)");
        }
        t.rule('-');

        if let Some(note) = order.order_note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            t.text(&format!("Note: {note}"));
            t.rule('-');
        }

        // Totals
        let total = order.total_amount.format_amount(currency);
        t.columns("Sous-total", &total);
        if order.delivery_method.is_delivery() {
            t.columns("Livraison", DELIVERY_FEE_LABEL);
        }
        t.columns("TOTAL", &total);
        t.rule('=');
        t.centered(THANKS);

        ReceiptTicket {
            width,
            lines: t.lines,
        }
    }
}

impl std::fmt::Display for ReceiptTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Public link to an order's receipt page: `<base>/receipt/<id>`.
pub fn receipt_url(base: &str, order_id: &str) -> String {
    format!("{}/receipt/{}", base.trim_end_matches('/'), order_id)
}

/// `9 mars 2026 14:05`. Conakry runs on UTC, so no offset is applied.
pub fn format_date_fr(at: DateTime<Utc>) -> String {
    let month = MONTHS_FR[at.month0() as usize];
    format!(
        "{} {} {} {:02}:{:02}",
        at.day(),
        month,
        at.year(),
        at.hour(),
        at.minute()
    )
}

// =============================================================================
// Layout Helpers
// =============================================================================

struct TicketWriter {
    width: usize,
    lines: Vec<String>,
}

impl TicketWriter {
    fn new(width: usize) -> Self {
        TicketWriter {
            width,
            lines: Vec::new(),
        }
    }

    fn rule(&mut self, c: char) {
        self.lines.push(c.to_string().repeat(self.width));
    }

    /// Left-aligned, word-wrapped.
    fn text(&mut self, text: &str) {
        let wrapped = wrap(text, self.width);
        self.lines.extend(wrapped);
    }

    fn centered(&mut self, text: &str) {
        for line in wrap(text, self.width) {
            let pad = (self.width - line.chars().count()) / 2;
            self.lines.push(format!("{}{}", " ".repeat(pad), line));
        }
    }

    /// `left` and `right` on one line; `right` moves to its own
    /// right-aligned line when both do not fit.
    fn columns(&mut self, left: &str, right: &str) {
        let (l, r) = (left.chars().count(), right.chars().count());
        if l + r < self.width {
            self.lines
                .push(format!("{left}{}{right}", " ".repeat(self.width - l - r)));
            return;
        }

        self.text(left);
        for line in wrap(right, self.width) {
            let pad = self.width - line.chars().count();
            self.lines.push(format!("{}{}", " ".repeat(pad), line));
        }
    }
}

/// Greedy word wrap by character count. Words longer than `width` are cut.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::fixtures::shop;
    use crate::types::{DeliveryMethod, GeoLocation, OrderItem, OrderStatus};

    fn order() -> CustomerOrder {
        CustomerOrder {
            id: "3f2a9c1b-aaaa-bbbb-cccc-000000000000".to_string(),
            short_ref: Some("VLM-4821".to_string()),
            shop_id: "shop-1".to_string(),
            customer_name: "Mamadou".to_string(),
            customer_phone: "622 00 12 34".to_string(),
            customer_address: None,
            customer_location: None,
            total_amount: Money::from_units(500_000),
            items_json: vec![OrderItem {
                id: "p1".to_string(),
                name: "Riz 25kg".to_string(),
                price: Money::from_units(250_000),
                quantity: 2,
                photo_url: None,
            }],
            delivery_method: DeliveryMethod::Pickup,
            order_note: None,
            status: OrderStatus::Pending,
            created_at: Some("2026-03-09T14:05:00Z".parse().unwrap()),
            updated_at: None,
            confirmed_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn test_narrow_ticket_layout() {
        let ticket = ReceiptTicket::render(&order(), Some(&shop()), ReceiptWidth::Narrow);
        let lines = &ticket.lines;

        assert_eq!(lines[0], "        Boutique Kaloum");
        assert!(lines.contains(&"Ref: #VLM-4821".to_string()));
        assert!(lines.contains(&"Date: 9 mars 2026 14:05".to_string()));
        assert!(lines.contains(&"      Commande En attente".to_string()));
        assert!(lines.contains(&"  2 x 250 000        500 000 GNF".to_string()));
        assert!(lines.contains(&"Sous-total           500 000 GNF".to_string()));
        assert!(lines.contains(&"TOTAL                500 000 GNF".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Livraison")));
        assert_eq!(lines.last().map(|l| l.trim()), Some(THANKS));

        for line in lines {
            assert!(line.chars().count() <= 32, "line too wide: {line:?}");
        }
    }

    #[test]
    fn test_delivery_ticket_shows_address_and_fee() {
        let mut order = order();
        order.delivery_method = DeliveryMethod::Delivery;
        order.customer_location = Some(GeoLocation { lat: 9.5, lng: -13.7 });
        order.order_note = Some("Sonner deux fois".to_string());

        let ticket = ReceiptTicket::render(&order, None, ReceiptWidth::Wide);
        let text = ticket.to_string();

        assert!(text.contains(FALLBACK_SHOP_NAME));
        assert!(text.contains("Adresse: Non précisée\n"));
        assert!(text.contains("GPS: https://www.google.com/maps?q=9.5,-13.7\n"));
        assert!(text.contains("Note: Sonner deux fois\n"));
        assert!(text.contains(DELIVERY_FEE_LABEL));
        for line in &ticket.lines {
            assert!(line.chars().count() <= 48, "line too wide: {line:?}");
        }
    }

    #[test]
    fn test_long_names_wrap() {
        let mut order = order();
        order.items_json[0].name =
            "Pagne wax hollandais six yards motif traditionnel".to_string();

        let ticket = ReceiptTicket::render(&order, Some(&shop()), ReceiptWidth::Narrow);
        assert!(ticket.lines.iter().all(|l| l.chars().count() <= 32));
        assert!(ticket.lines.contains(&"Pagne wax hollandais six yards".to_string()));
        assert!(ticket.lines.contains(&"motif traditionnel".to_string()));
    }

    #[test]
    fn test_width_from_columns() {
        assert_eq!(ReceiptWidth::try_from(32).unwrap(), ReceiptWidth::Narrow);
        assert_eq!(ReceiptWidth::try_from(48).unwrap().columns(), 48);
        assert!(ReceiptWidth::try_from(40).is_err());
    }

    #[test]
    fn test_wrap_cuts_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 4), vec![""]);
        assert_eq!(wrap("ab cd ef", 5), vec!["ab cd", "ef"]);
    }

    #[test]
    fn test_receipt_url() {
        assert_eq!(
            receipt_url("https://velmo.app/", "abc"),
            "https://velmo.app/receipt/abc"
        );
    }
}
