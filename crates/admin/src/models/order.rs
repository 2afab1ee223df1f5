//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sareine_core::{Amount, OrderId, OrderStatus, UserId};

const fn one() -> u32 {
    1
}

/// A line item on an order or preorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub name: String,
    /// Unit price.
    #[serde(default)]
    pub price: Amount,
    #[serde(default = "one")]
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Amount {
        self.price * self.quantity
    }
}

/// Delivery address captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// A paid storefront order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Customer name, falling back to the shipping name, then `Unknown`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_empty(&self.customer_name)
            .or_else(|| {
                self.shipping_address
                    .as_ref()
                    .and_then(|a| non_empty(&a.name))
            })
            .unwrap_or("Unknown")
    }

    /// Customer email, falling back to the shipping email.
    #[must_use]
    pub fn contact_email(&self) -> &str {
        non_empty(&self.customer_email)
            .or_else(|| {
                self.shipping_address
                    .as_ref()
                    .and_then(|a| non_empty(&a.email))
            })
            .unwrap_or("")
    }

    /// Whether the name or email contains `needle` (already lowercased).
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        self.customer_name.to_lowercase().contains(needle)
            || self.customer_email.to_lowercase().contains(needle)
    }
}

pub(crate) fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Newest first; records without a timestamp sort last.
pub(crate) fn newest_first(
    a: Option<&DateTime<Utc>>,
    b: Option<&DateTime<Utc>>,
) -> std::cmp::Ordering {
    b.cmp(&a)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_json() -> &'static str {
        r#"{
            "id": "ord_1",
            "customerName": "",
            "customerEmail": "",
            "amount": 1299,
            "status": "paid",
            "items": [{"name": "Damask Rose Balm", "price": 649.5, "quantity": 2}],
            "shippingAddress": {"name": "Ananya Rao", "email": "ananya@example.in", "phone": "9876543210",
                                "street": "12 MG Road", "city": "Bengaluru", "state": "KA", "zip": "560001"},
            "createdAt": {"_seconds": 1767225600, "_nanoseconds": 0}
        }"#
    }

    #[test]
    fn test_deserialize_document() {
        let order: Order = serde_json::from_str(order_json()).unwrap();
        assert_eq!(order.id.as_str(), "ord_1");
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.items[0].line_total(), Amount::from_rupees(1299));
        assert!(order.created_at.is_some());
        assert!(order.updated_at.is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_shipping() {
        let order: Order = serde_json::from_str(order_json()).unwrap();
        assert_eq!(order.display_name(), "Ananya Rao");
        assert_eq!(order.contact_email(), "ananya@example.in");
    }

    #[test]
    fn test_display_name_unknown() {
        let order: Order = serde_json::from_str(r#"{"id": "ord_2"}"#).unwrap();
        assert_eq!(order.display_name(), "Unknown");
        assert_eq!(order.contact_email(), "");
        assert_eq!(order.amount, Amount::ZERO);
    }

    #[test]
    fn test_item_quantity_defaults_to_one() {
        let item: OrderItem = serde_json::from_str(r#"{"name": "Jasmine", "price": 450}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let order: Order = serde_json::from_str(order_json()).unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["customerEmail"], "");
        assert_eq!(value["shippingAddress"]["zip"], "560001");
        assert!(value.get("userId").is_none());
    }
}
