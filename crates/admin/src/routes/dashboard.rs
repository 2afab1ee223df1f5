//! Dashboard route handler.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use tracing::instrument;

use crate::{
    filters,
    middleware::RequireAdminAuth,
    services::stats::{Activity, ActivityKind, DashboardStats},
    state::AppState,
};

use super::api::stats::load_stats;
use super::{format_timestamp, render};

/// Dashboard metrics.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub total_orders: String,
    pub total_preorders: String,
    pub revenue: String,
    pub pending_preorders: String,
    pub to_dispatch: String,
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self {
            total_orders: "0".to_string(),
            total_preorders: "0".to_string(),
            revenue: "₹0".to_string(),
            pending_preorders: "0".to_string(),
            to_dispatch: "0".to_string(),
        }
    }
}

/// Activity item for dashboard.
#[derive(Debug, Clone)]
pub struct ActivityView {
    pub kind: &'static str,
    pub icon: &'static str,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: String,
    pub status: String,
    pub created_at: String,
}

impl From<&Activity> for ActivityView {
    fn from(activity: &Activity) -> Self {
        let (kind, icon) = match activity.kind {
            ActivityKind::Order => ("Order", "📦"),
            ActivityKind::Preorder => ("Pre-order", "⏳"),
        };
        Self {
            kind,
            icon,
            customer_name: activity.customer_name.clone(),
            customer_email: activity.customer_email.clone(),
            amount: activity.amount.to_string(),
            status: activity.status.replace('_', " "),
            created_at: format_timestamp(activity.created_at.as_ref()),
        }
    }
}

/// Revenue for one day.
#[derive(Debug, Clone)]
pub struct RevenueRow {
    pub date: String,
    pub revenue: String,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub metrics: DashboardMetrics,
    pub recent_activity: Vec<ActivityView>,
    pub revenue_by_date: Vec<RevenueRow>,
}

impl DashboardTemplate {
    fn from_stats(stats: &DashboardStats) -> Self {
        Self {
            current_path: "/".to_string(),
            success_message: None,
            error_message: None,
            metrics: DashboardMetrics {
                total_orders: stats.total_orders.to_string(),
                total_preorders: stats.total_preorders.to_string(),
                revenue: stats.total_revenue.to_string(),
                pending_preorders: stats.pending_preorders.to_string(),
                to_dispatch: stats.to_dispatch.to_string(),
            },
            recent_activity: stats.recent_activity.iter().map(ActivityView::from).collect(),
            // Newest day first
            revenue_by_date: stats
                .revenue_by_date
                .iter()
                .rev()
                .map(|(date, revenue)| RevenueRow {
                    date: date.clone(),
                    revenue: revenue.to_string(),
                })
                .collect(),
        }
    }
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
#[instrument(skip(_admin, state))]
pub async fn dashboard(_admin: RequireAdminAuth, State(state): State<AppState>) -> Html<String> {
    let template = match load_stats(&state).await {
        Ok(stats) => DashboardTemplate::from_stats(&stats),
        Err(e) => {
            tracing::error!("Failed to load dashboard stats: {e}");
            DashboardTemplate {
                current_path: "/".to_string(),
                success_message: None,
                error_message: Some("Failed to load statistics".to_string()),
                metrics: DashboardMetrics::default(),
                recent_activity: Vec::new(),
                revenue_by_date: Vec::new(),
            }
        }
    };

    render(&template)
}
