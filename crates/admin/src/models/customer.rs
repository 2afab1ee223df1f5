//! Storefront users and their order aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sareine_core::{Amount, OrderId, OrderStatus, UserId};

use super::order::OrderItem;

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default, with = "sareine_core::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An order as listed under a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    pub id: OrderId,
    pub amount: Amount,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

/// A user joined with the orders attributed to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub phone: String,
    pub created_at: Option<DateTime<Utc>>,
    pub order_count: usize,
    pub total_spend: Amount,
    pub orders: Vec<CustomerOrder>,
}
