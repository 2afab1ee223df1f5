//! Askama templates for every email kind.
//!
//! Each render function returns the subject, the branded HTML body and a
//! plain-text alternative. HTML templates share `email/base.html`; all
//! interpolated values are escaped by Askama.

use askama::Template;

use sareine_core::Amount;

use crate::filters;
use crate::models::{Order, OrderItem, Preorder, ShippingAddress};

/// Subject, HTML and plain-text body of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// One row of the order summary table.
#[derive(Debug, Clone)]
pub struct ItemLine {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&OrderItem> for ItemLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            line_total: item.line_total().to_string(),
        }
    }
}

fn item_lines(items: &[OrderItem]) -> Vec<ItemLine> {
    items.iter().map(ItemLine::from).collect()
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    customer_name: &'a str,
    items: Vec<ItemLine>,
    total: String,
    shipping: Option<&'a ShippingAddress>,
    payment_id: &'a str,
}

#[derive(Template)]
#[template(path = "email/preorder_confirmation.html")]
struct PreorderConfirmationHtml<'a> {
    customer_name: &'a str,
    preorder_ref: &'a str,
    items: Vec<ItemLine>,
    total: String,
    shipping: Option<&'a ShippingAddress>,
}

#[derive(Template)]
#[template(path = "email/payment_link.html")]
struct PaymentLinkHtml<'a> {
    customer_name: &'a str,
    preorder_ref: &'a str,
    amount: String,
    payment_link: &'a str,
}

#[derive(Template)]
#[template(path = "email/dispatch.html")]
struct DispatchHtml<'a> {
    customer_name: &'a str,
    order_id: &'a str,
    items: Vec<ItemLine>,
    total: String,
    shipping: Option<&'a ShippingAddress>,
}

#[derive(Template)]
#[template(path = "email/delivery.html")]
struct DeliveryHtml<'a> {
    customer_name: &'a str,
    order_id: &'a str,
    items: Vec<ItemLine>,
    total: String,
}

#[derive(Template)]
#[template(path = "email/promotional.html")]
struct PromotionalHtml<'a> {
    heading: &'a str,
    body_text: &'a str,
    cta: Option<(&'a str, &'a str)>,
}

#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeHtml<'a> {
    customer_name: &'a str,
    storefront_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/custom.html")]
struct CustomHtml<'a> {
    heading: &'a str,
    body_text: &'a str,
}

/// Plain-text alternative shared by every kind.
#[derive(Template)]
#[template(path = "email/plain.txt")]
struct PlainText<'a> {
    heading: &'a str,
    paragraphs: &'a [String],
}

fn plain(heading: &str, paragraphs: &[String]) -> Result<String, askama::Error> {
    PlainText {
        heading,
        paragraphs,
    }
    .render()
}

fn items_paragraph(items: &[OrderItem], total: Amount) -> String {
    let mut lines: Vec<String> = items
        .iter()
        .map(|i| format!("{} x{}  {}", i.name, i.quantity, i.line_total()))
        .collect();
    lines.push(format!("Total: {total}"));
    lines.join("\n")
}

fn shipping_paragraph(addr: &ShippingAddress) -> String {
    format!(
        "Shipping to:\n{}\n{}\n{}, {} {}\nPhone: {}",
        addr.name, addr.street, addr.city, addr.state, addr.zip, addr.phone
    )
}

/// "Order Confirmed" email for a paid order.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn order_confirmation(order: &Order) -> Result<RenderedEmail, askama::Error> {
    let payment_id = order.razorpay_payment_id.as_deref().unwrap_or("N/A");
    let html = OrderConfirmationHtml {
        customer_name: order.display_name(),
        items: item_lines(&order.items),
        total: order.amount.to_string(),
        shipping: order.shipping_address.as_ref(),
        payment_id,
    }
    .render()?;

    let mut paragraphs = vec![
        "Your payment has been confirmed. We are preparing your order with care.".to_string(),
        items_paragraph(&order.items, order.amount),
    ];
    paragraphs.extend(order.shipping_address.as_ref().map(shipping_paragraph));
    paragraphs.push(format!("Payment ID: {payment_id}"));

    Ok(RenderedEmail {
        subject: "Order Confirmed — Sareine".to_string(),
        html,
        text: plain(&format!("Thank you, {}!", order.display_name()), &paragraphs)?,
    })
}

/// "Pre-order Confirmed" email.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn preorder_confirmation(preorder: &Preorder) -> Result<RenderedEmail, askama::Error> {
    let reference = preorder.reference();
    let html = PreorderConfirmationHtml {
        customer_name: preorder.display_name(),
        preorder_ref: reference,
        items: item_lines(&preorder.items),
        total: preorder.amount.to_string(),
        shipping: preorder.shipping_address.as_ref(),
    }
    .render()?;

    let mut paragraphs = vec![
        "Your pre-order has been received. We'll reach out with a payment link when it's ready to ship.".to_string(),
        format!("Pre-order ID: {reference}"),
        items_paragraph(&preorder.items, preorder.amount),
    ];
    paragraphs.extend(preorder.shipping_address.as_ref().map(shipping_paragraph));
    paragraphs.push(
        "What happens next? You'll receive a payment link via email once manufacturing is complete (~10 days). No payment is needed now."
            .to_string(),
    );

    Ok(RenderedEmail {
        subject: format!("Pre-order Confirmed — {reference} — Sareine"),
        html,
        text: plain(&format!("Thank you, {}!", preorder.display_name()), &paragraphs)?,
    })
}

/// "Complete Your Payment" email carrying a hosted payment link.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn payment_link(
    customer_name: &str,
    preorder_ref: &str,
    amount: Amount,
    link: &str,
) -> Result<RenderedEmail, askama::Error> {
    let html = PaymentLinkHtml {
        customer_name,
        preorder_ref,
        amount: amount.to_string(),
        payment_link: link,
    }
    .render()?;

    let paragraphs = vec![
        format!(
            "Great news! Your pre-order {preorder_ref} is ready. Please complete your payment to proceed with shipping."
        ),
        format!("Amount due: {amount}"),
        format!("Pay now: {link}"),
    ];

    Ok(RenderedEmail {
        subject: format!("Complete Your Payment — {preorder_ref} — Sareine"),
        html,
        text: plain(&format!("Hi {customer_name},"), &paragraphs)?,
    })
}

/// "Your Order Has Been Shipped" email.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn dispatch(order: &Order) -> Result<RenderedEmail, askama::Error> {
    let html = DispatchHtml {
        customer_name: order.display_name(),
        order_id: order.id.as_str(),
        items: item_lines(&order.items),
        total: order.amount.to_string(),
        shipping: order.shipping_address.as_ref(),
    }
    .render()?;

    let mut paragraphs = vec![
        format!(
            "Hi {}, your order {} is on its way to you.",
            order.display_name(),
            order.id
        ),
        items_paragraph(&order.items, order.amount),
    ];
    paragraphs.extend(order.shipping_address.as_ref().map(shipping_paragraph));
    paragraphs.push(
        "Your package has been dispatched and should arrive within 5-7 business days.".to_string(),
    );

    Ok(RenderedEmail {
        subject: "Your Order Has Been Shipped — Sareine".to_string(),
        html,
        text: plain("Your order has been shipped!", &paragraphs)?,
    })
}

/// "Your Order Has Been Delivered" email.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn delivery(order: &Order) -> Result<RenderedEmail, askama::Error> {
    let html = DeliveryHtml {
        customer_name: order.display_name(),
        order_id: order.id.as_str(),
        items: item_lines(&order.items),
        total: order.amount.to_string(),
    }
    .render()?;

    let paragraphs = vec![
        format!(
            "Hi {}, your order {} has been successfully delivered.",
            order.display_name(),
            order.id
        ),
        items_paragraph(&order.items, order.amount),
        "We hope you love your Sareine products! If you have any questions or feedback, please reach out."
            .to_string(),
    ];

    Ok(RenderedEmail {
        subject: "Your Order Has Been Delivered — Sareine".to_string(),
        html,
        text: plain("Your order has been delivered!", &paragraphs)?,
    })
}

/// Announcement email with an optional call-to-action button.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn promotional(
    subject: &str,
    heading: &str,
    body_text: &str,
    cta: Option<(&str, &str)>,
) -> Result<RenderedEmail, askama::Error> {
    let html = PromotionalHtml {
        heading,
        body_text,
        cta,
    }
    .render()?;

    let mut paragraphs = vec![body_text.to_string()];
    paragraphs.extend(cta.map(|(text, url)| format!("{text}: {url}")));

    Ok(RenderedEmail {
        subject: subject.to_string(),
        html,
        text: plain(heading, &paragraphs)?,
    })
}

/// Welcome email for a new customer.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn welcome(customer_name: &str, storefront_url: &str) -> Result<RenderedEmail, askama::Error> {
    let html = WelcomeHtml {
        customer_name,
        storefront_url,
    }
    .render()?;

    let paragraphs = vec![
        "We're delighted to have you join the Sareine family. Our luxury lip balms are crafted with exotic botanicals for effortlessly soft, nourished lips.".to_string(),
        "Expect exclusive access to limited edition collections, early notifications on new launches and special offers crafted just for you.".to_string(),
        format!("Explore Sareine: {storefront_url}"),
    ];

    Ok(RenderedEmail {
        subject: "Welcome to Sareine 💛".to_string(),
        html,
        text: plain(&format!("Welcome to Sareine, {customer_name}!"), &paragraphs)?,
    })
}

/// Free-form email composed in the dashboard.
///
/// # Errors
///
/// Returns an error if a template fails to render.
pub fn custom(subject: &str, heading: &str, body_text: &str) -> Result<RenderedEmail, askama::Error> {
    let html = CustomHtml { heading, body_text }.render()?;

    Ok(RenderedEmail {
        subject: subject.to_string(),
        html,
        text: plain(heading, &[body_text.to_string()])?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "id": "ord_77",
            "customerName": "Riya <script>",
            "customerEmail": "riya@example.in",
            "amount": 1299,
            "status": "dispatched",
            "items": [
                {"name": "Damask Rose Balm", "price": 649.5, "quantity": 2}
            ],
            "shippingAddress": {
                "name": "Riya Sen", "email": "riya@example.in", "phone": "9800000000",
                "street": "4 Park Street", "city": "Kolkata", "state": "WB", "zip": "700016"
            },
            "razorpayPaymentId": "pay_123"
        }))
        .unwrap()
    }

    #[test]
    fn test_order_confirmation_content() {
        let email = order_confirmation(&order()).unwrap();
        assert_eq!(email.subject, "Order Confirmed — Sareine");
        assert!(email.html.contains("Damask Rose Balm"));
        assert!(email.html.contains("₹1299"));
        assert!(email.html.contains("Kolkata"));
        assert!(email.html.contains("pay_123"));
        assert!(email.text.contains("Total: ₹1299"));
    }

    #[test]
    fn test_values_are_escaped() {
        let email = dispatch(&order()).unwrap();
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_footer_has_current_year() {
        use chrono::Datelike;
        let year = chrono::Utc::now().year().to_string();
        let email = custom("Hi", "Hello", "Body").unwrap();
        assert!(email.html.contains(&year));
    }

    #[test]
    fn test_delivery_has_no_shipping_block() {
        let email = delivery(&order()).unwrap();
        assert_eq!(email.subject, "Your Order Has Been Delivered — Sareine");
        assert!(!email.html.contains("Shipping To"));
        assert!(dispatch(&order()).unwrap().html.contains("Shipping To"));
    }

    #[test]
    fn test_payment_link_subject_and_button() {
        let email = payment_link(
            "Meera",
            "PRE-2041",
            Amount::from_rupees(899),
            "https://rzp.io/i/abc123",
        )
        .unwrap();
        assert_eq!(email.subject, "Complete Your Payment — PRE-2041 — Sareine");
        assert!(email.html.contains("https://rzp.io/i/abc123"));
        assert!(email.html.contains("₹899"));
    }

    #[test]
    fn test_promotional_cta_optional() {
        let with = promotional("Sale", "Hello", "Big sale", Some(("Shop", "https://sareine.in")))
            .unwrap();
        assert!(with.html.contains("https://sareine.in"));
        let without = promotional("Sale", "Hello", "Big sale", None).unwrap();
        assert!(!without.html.contains("Shop</a>"));
    }

    #[test]
    fn test_preorder_subject_uses_reference() {
        let preorder: Preorder = serde_json::from_value(serde_json::json!({
            "id": "doc1", "preorderId": "PRE-1001", "customerName": "Zoya", "amount": 450
        }))
        .unwrap();
        let email = preorder_confirmation(&preorder).unwrap();
        assert_eq!(email.subject, "Pre-order Confirmed — PRE-1001 — Sareine");
        assert!(email.html.contains("PRE-1001"));
    }

    #[test]
    fn test_welcome_subject() {
        let email = welcome("Isha", "https://sareine.in").unwrap();
        assert_eq!(email.subject, "Welcome to Sareine 💛");
        assert!(email.text.contains("Welcome to Sareine, Isha!"));
    }
}
