//! Dashboard statistics computed from the full order and preorder lists.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use sareine_core::{Amount, OrderStatus, PreorderStatus};

use crate::models::order::newest_first;
use crate::models::{Order, Preorder};

/// Window for `revenue_by_date`.
pub const REVENUE_WINDOW_DAYS: i64 = 30;

/// Entries in `recent_activity`.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Order,
    Preorder,
}

/// One row of the combined order/preorder feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: Amount,
    pub status: &'static str,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_preorders: usize,
    pub total_revenue: Amount,
    pub pending_preorders: usize,
    pub to_dispatch: usize,
    /// `YYYY-MM-DD` to revenue, for orders in the window.
    pub revenue_by_date: BTreeMap<String, Amount>,
    pub recent_activity: Vec<Activity>,
}

impl From<&Order> for Activity {
    fn from(order: &Order) -> Self {
        Self {
            kind: ActivityKind::Order,
            id: order.id.to_string(),
            customer_name: order.display_name().to_string(),
            customer_email: order.contact_email().to_string(),
            amount: order.amount,
            status: order.status.as_str(),
            created_at: order.created_at,
        }
    }
}

impl From<&Preorder> for Activity {
    fn from(preorder: &Preorder) -> Self {
        Self {
            kind: ActivityKind::Preorder,
            id: preorder.id.to_string(),
            customer_name: preorder.display_name().to_string(),
            customer_email: preorder.contact_email().to_string(),
            amount: preorder.amount,
            status: preorder.status.as_str(),
            created_at: preorder.created_at,
        }
    }
}

/// Compute every dashboard figure as of `now`.
#[must_use]
pub fn compute(orders: &[Order], preorders: &[Preorder], now: DateTime<Utc>) -> DashboardStats {
    let window_start = now - Duration::days(REVENUE_WINDOW_DAYS);

    let mut revenue_by_date: BTreeMap<String, Amount> = BTreeMap::new();
    for order in orders {
        if let Some(created) = order.created_at.filter(|c| *c >= window_start) {
            *revenue_by_date
                .entry(created.format("%Y-%m-%d").to_string())
                .or_default() += order.amount;
        }
    }

    let mut recent_activity: Vec<Activity> = orders
        .iter()
        .map(Activity::from)
        .chain(preorders.iter().map(Activity::from))
        .collect();
    recent_activity.sort_by(|a, b| newest_first(a.created_at.as_ref(), b.created_at.as_ref()));
    recent_activity.truncate(RECENT_ACTIVITY_LIMIT);

    DashboardStats {
        total_orders: orders.len(),
        total_preorders: preorders.len(),
        total_revenue: orders.iter().map(|o| o.amount).sum(),
        pending_preorders: preorders
            .iter()
            .filter(|p| p.status == PreorderStatus::PendingConfirmation)
            .count(),
        to_dispatch: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Paid)
            .count(),
        revenue_by_date,
        recent_activity,
    }
}
