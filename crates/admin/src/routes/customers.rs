//! Customer list page.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CustomerSummary;
use crate::state::AppState;

use super::api::customers::load_customers;
use super::{format_timestamp, render};

/// Customer row for the list.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub photo_url: String,
    pub order_count: usize,
    pub total_spend: String,
    pub joined: String,
    pub last_order: String,
}

impl From<&CustomerSummary> for CustomerRow {
    fn from(customer: &CustomerSummary) -> Self {
        let last_order = customer
            .orders
            .iter()
            .filter_map(|o| o.created_at.as_ref())
            .max();
        Self {
            name: customer.display_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            photo_url: customer.photo_url.clone(),
            order_count: customer.order_count,
            total_spend: customer.total_spend.to_string(),
            joined: format_timestamp(customer.created_at.as_ref()),
            last_order: format_timestamp(last_order),
        }
    }
}

/// Customers page template.
#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub customers: Vec<CustomerRow>,
    pub search: String,
}

/// Build the customers page router.
pub fn router() -> Router<AppState> {
    Router::new().route("/customers", get(customers_page))
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomersPageQuery {
    pub search: Option<String>,
}

/// GET /customers
#[instrument(skip(_admin, state))]
async fn customers_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CustomersPageQuery>,
) -> Html<String> {
    let (customers, error_message) = match load_customers(&state, query.search.as_deref()).await {
        Ok(customers) => (customers.iter().map(CustomerRow::from).collect(), None),
        Err(e) => {
            tracing::error!("Failed to load customers: {e}");
            (Vec::new(), Some(e.public_message()))
        }
    };

    render(&CustomersTemplate {
        current_path: "/customers".to_string(),
        success_message: None,
        error_message,
        customers,
        search: query.search.unwrap_or_default(),
    })
}
