//! Status enums for orders, preorders and outgoing emails.
//!
//! Status values are plain string tags in the document store. Handlers set
//! them directly; nothing here restricts which status may follow which.

use serde::{Deserialize, Serialize};

/// Error returned when a status or kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    /// What was being parsed (e.g. "order status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// The stored string tag.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }

            /// Human-readable label (`payment_link_sent` → `payment link sent`).
            #[must_use]
            pub fn label(&self) -> String {
                self.as_str().replace('_', " ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(UnknownVariant {
                        kind: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Fulfilment status of a paid order.
    OrderStatus, "order status" {
        /// Payment captured; waiting to be shipped.
        Paid => "paid",
        /// Handed to the courier.
        Dispatched => "dispatched",
        /// Received by the customer.
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// Lifecycle of a preorder placed before payment.
    PreorderStatus, "preorder status" {
        /// Received; no payment requested yet.
        PendingConfirmation => "pending_confirmation",
        /// A payment link has been emailed to the customer.
        PaymentLinkSent => "payment_link_sent",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// Template used for an outgoing email.
    EmailKind, "email type" {
        OrderConfirmation => "order_confirmation",
        PreorderConfirmation => "preorder_confirmation",
        PaymentLink => "payment_link",
        Dispatch => "dispatch",
        Delivery => "delivery",
        Promotional => "promotional",
        Welcome => "welcome",
        Custom => "custom",
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Paid
    }
}

impl Default for PreorderStatus {
    fn default() -> Self {
        Self::PendingConfirmation
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid order status: shipped");
    }

    #[test]
    fn test_preorder_status_serde_is_snake_case() {
        let json = serde_json::to_string(&PreorderStatus::PaymentLinkSent).unwrap();
        assert_eq!(json, "\"payment_link_sent\"");
        let back: PreorderStatus = serde_json::from_str("\"pending_confirmation\"").unwrap();
        assert_eq!(back, PreorderStatus::PendingConfirmation);
    }

    #[test]
    fn test_label_replaces_underscores() {
        assert_eq!(PreorderStatus::PaymentLinkSent.label(), "payment link sent");
        assert_eq!(OrderStatus::Paid.label(), "paid");
    }

    #[test]
    fn test_email_kind_parse() {
        assert_eq!("dispatch".parse::<EmailKind>().unwrap(), EmailKind::Dispatch);
        assert_eq!(
            "newsletter".parse::<EmailKind>().unwrap_err().kind,
            "email type"
        );
        assert_eq!(EmailKind::ALL.len(), 8);
    }
}
