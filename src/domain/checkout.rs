//! Payment handoff for the manual UPI flow.
//!
//! Builds the `upi://pay` intent (rendered as a QR by an external service)
//! and the prefilled WhatsApp confirmation message the shopper sends after
//! paying. No network calls happen here.

use serde::Serialize;

use crate::domain::order::{Order, OrderItem};

/// Everything the payment step of the checkout wizard needs.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentHandoff {
    pub upi_intent: String,
    pub whatsapp_message: String,
    pub whatsapp_link: String,
}

pub fn payment_handoff(
    order: &Order,
    items: &[OrderItem],
    store_name: &str,
    upi_vpa: &str,
    upi_payee: &str,
    whatsapp_number: &str,
) -> PaymentHandoff {
    let note = format!("Order {}", order.order_number);
    let message = order_message(order, items, store_name);
    PaymentHandoff {
        upi_intent: upi_intent(upi_vpa, upi_payee, order.total, &note),
        whatsapp_link: whatsapp_link(whatsapp_number, &message),
        whatsapp_message: message,
    }
}

/// Fixed-scheme UPI payment intent with payee, fixed amount and a note.
pub fn upi_intent(vpa: &str, payee: &str, amount: i64, note: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}",
        encode(vpa),
        encode(payee),
        amount,
        encode(note)
    )
}

/// Human-readable order summary the shopper forwards over WhatsApp.
pub fn order_message(order: &Order, items: &[OrderItem], store_name: &str) -> String {
    let mut msg = format!("New order {} at {store_name}\n\n", order.order_number);

    for (i, item) in items.iter().enumerate() {
        let mut options = Vec::new();
        if let Some(color) = item.color.as_deref().filter(|c| !c.is_empty()) {
            options.push(color.to_string());
        }
        if let Some(label) = packaging_label(&item.packaging) {
            options.push(label.to_string());
        }
        let options = if options.is_empty() {
            String::new()
        } else {
            format!(" ({})", options.join(", "))
        };
        msg.push_str(&format!(
            "{}. {} x{}{options} = \u{20b9}{}\n",
            i + 1,
            item.name,
            item.quantity,
            item.line_total,
        ));
    }

    msg.push_str(&format!("\nSubtotal: \u{20b9}{}\n", order.subtotal));
    if order.packaging_charges > 0 {
        msg.push_str(&format!("Packaging: \u{20b9}{}\n", order.packaging_charges));
    }
    if let Some(code) = order.coupon_code.as_deref() {
        if order.discount > 0 {
            msg.push_str(&format!("Discount ({code}): -\u{20b9}{}\n", order.discount));
        }
    }
    msg.push_str(&format!("Total: \u{20b9}{}\n", order.total));
    if order.free_shipping {
        msg.push_str("Free shipping applied.\n");
    }

    msg.push_str(&format!(
        "\nDeliver to:\n{}\n{}\n",
        order.customer_name, order.address_line1
    ));
    if let Some(line2) = order.address_line2.as_deref().filter(|l| !l.is_empty()) {
        msg.push_str(line2);
        msg.push('\n');
    }
    msg.push_str(&format!(
        "{}, {} - {}\nPhone: {}\n",
        order.city, order.state, order.pincode, order.phone
    ));

    msg.push_str(&format!(
        "\nPaid \u{20b9}{} via UPI. Reference: <add after payment>",
        order.total
    ));
    msg
}

/// `https://wa.me/` deep link with the message prefilled.
pub fn whatsapp_link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{digits}?text={}", encode(message))
}

fn packaging_label(packaging: &str) -> Option<&'static str> {
    match packaging {
        "indian" => Some("Indian packaging"),
        "imported" => Some("Imported packaging"),
        _ => None,
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn order() -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-00001234".into(),
            session_id: "sess-1".into(),
            customer_name: "Asha Rao".into(),
            phone: "9876543210".into(),
            email: None,
            address_line1: "12 MG Road".into(),
            address_line2: Some("Flat 4".into()),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560001".into(),
            status: "awaiting_payment".into(),
            subtotal: 5998,
            packaging_charges: 140,
            discount: 921,
            total: 5217,
            coupon_code: Some("COMBO15".into()),
            free_shipping: false,
            payment_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(order_id: Uuid) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: Uuid::new_v4(),
            name: "Aviator Pro Goggles".into(),
            unit_price: 2999,
            quantity: 2,
            color: Some("Black".into()),
            packaging: "indian".into(),
            packaging_fee: 70,
            line_total: 5998,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upi_intent_embeds_payee_amount_and_note() {
        let uri = upi_intent("meherstore@upi", "Meher Store", 3069, "Order ORD-1");
        assert_eq!(
            uri,
            "upi://pay?pa=meherstore%40upi&pn=Meher%20Store&am=3069&cu=INR&tn=Order%20ORD-1"
        );
    }

    #[test]
    fn link_strips_non_digits_from_number() {
        let link = whatsapp_link("+91 98765 43210", "hi");
        assert!(link.starts_with("https://wa.me/919876543210?text="));
    }

    #[test]
    fn message_lists_items_options_and_totals() {
        let o = order();
        let msg = order_message(&o, &[item(o.id)], "Meher Store");
        assert!(msg.contains("ORD-00001234"));
        assert!(msg.contains("Aviator Pro Goggles x2 (Black, Indian packaging)"));
        assert!(msg.contains("Subtotal: \u{20b9}5998"));
        assert!(msg.contains("Packaging: \u{20b9}140"));
        assert!(msg.contains("Discount (COMBO15): -\u{20b9}921"));
        assert!(msg.contains("Total: \u{20b9}5217"));
        assert!(msg.contains("Bengaluru, Karnataka - 560001"));
        assert!(!msg.contains("Free shipping"));
    }

    #[test]
    fn free_shipping_noted_without_discount_line() {
        let mut o = order();
        o.coupon_code = Some("FREESHIP".into());
        o.discount = 0;
        o.free_shipping = true;
        let msg = order_message(&o, &[item(o.id)], "Meher Store");
        assert!(msg.contains("Free shipping applied."));
        assert!(!msg.contains("Discount ("));
    }

    #[test]
    fn handoff_ties_the_pieces_together() {
        let o = order();
        let items = [item(o.id)];
        let handoff =
            payment_handoff(&o, &items, "Meher Store", "meherstore@upi", "Meher Store", "+919876543210");
        assert!(handoff.upi_intent.contains("am=5217"));
        assert!(handoff.upi_intent.contains("tn=Order%20ORD-00001234"));
        assert!(handoff.whatsapp_link.contains("wa.me/919876543210"));
        assert!(handoff.whatsapp_message.contains("ORD-00001234"));
    }
}
