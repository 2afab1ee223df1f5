//! Preorder domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sareine_core::{Amount, PreorderId, PreorderStatus, UserId};

use super::order::{OrderItem, ShippingAddress, non_empty};

/// The payment link last sent for a preorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkRef {
    /// Gateway link id (`plink_...`).
    pub id: String,
    /// Hosted payment page URL.
    pub short_url: String,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An order placed before payment.
///
/// `preorder_id` is the human reference shown to customers; `id` is the
/// document key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preorder {
    pub id: PreorderId,
    #[serde(default)]
    pub preorder_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub status: PreorderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<PaymentLinkRef>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Preorder {
    /// Phone for the payment gateway: shipping phone, else the preorder phone.
    #[must_use]
    pub fn contact_phone(&self) -> &str {
        self.shipping_address
            .as_ref()
            .and_then(|a| non_empty(&a.phone))
            .unwrap_or(&self.phone)
    }

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

    /// Reference shown to the customer, falling back to the document id.
    #[must_use]
    pub fn reference(&self) -> &str {
        non_empty(&self.preorder_id).unwrap_or_else(|| self.id.as_str())
    }

    /// Whether [`Self::reference`] resolves to `reference`.
    #[must_use]
    pub fn has_reference(&self, reference: &str) -> bool {
        !reference.trim().is_empty() && self.reference() == reference
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_phone_prefers_shipping() {
        let preorder: Preorder = serde_json::from_str(
            r#"{"id": "p1", "preorderId": "PRE-1001", "phone": "111",
                "shippingAddress": {"phone": "222"}}"#,
        )
        .unwrap();
        assert_eq!(preorder.contact_phone(), "222");
    }

    #[test]
    fn test_contact_phone_falls_back() {
        let preorder: Preorder = serde_json::from_str(
            r#"{"id": "p1", "phone": "111", "shippingAddress": {"phone": ""}}"#,
        )
        .unwrap();
        assert_eq!(preorder.contact_phone(), "111");
        assert_eq!(preorder.reference(), "p1");
        assert!(preorder.has_reference("p1"));
        assert_eq!(preorder.status, PreorderStatus::PendingConfirmation);
    }

    #[test]
    fn test_has_reference_ignores_blank() {
        let preorder: Preorder = serde_json::from_str(r#"{"id": "p1", "preorderId": ""}"#).unwrap();
        assert!(!preorder.has_reference(""));
        assert!(!preorder.has_reference("  "));

        let named: Preorder =
            serde_json::from_str(r#"{"id": "p2", "preorderId": "PRE-1001"}"#).unwrap();
        assert!(named.has_reference("PRE-1001"));
        assert!(!named.has_reference("p2"));
    }

    #[test]
    fn test_payment_link_omitted_until_set() {
        let preorder: Preorder = serde_json::from_str(r#"{"id": "p1"}"#).unwrap();
        let value = serde_json::to_value(&preorder).unwrap();
        assert!(value.get("paymentLink").is_none());
        assert_eq!(value["status"], "pending_confirmation");
    }
}
