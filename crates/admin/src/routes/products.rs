//! Product catalogue pages.
//!
//! List fields (ingredients, features, benefits) are edited as one entry
//! per line.

use std::str::FromStr;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use sareine_core::{Amount, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::state::AppState;

use super::api::products::{create_product, delete_product, update_product};
use super::{FlashQuery, format_timestamp, redirect_error, redirect_success, render};

/// Product row for the list.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub price: String,
    pub in_stock: bool,
    pub updated_at: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            in_stock: product.in_stock,
            updated_at: format_timestamp(product.updated_at.as_ref()),
        }
    }
}

/// Values shown in the create/edit form.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub price: String,
    pub slug: String,
    pub category: String,
    pub in_stock: bool,
    pub tagline: String,
    pub description: String,
    pub how_to_use: String,
    pub packaging: String,
    pub weight: String,
    pub image: String,
    pub ingredients: String,
    pub features: String,
    pub benefits: String,
}

impl From<&Product> for ProductFormView {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.value().normalize().to_string(),
            slug: product.slug.clone(),
            category: product.category.clone(),
            in_stock: product.in_stock,
            tagline: product.tagline.clone(),
            description: product.description.clone(),
            how_to_use: product.how_to_use.clone(),
            packaging: product.packaging.clone(),
            weight: product.weight.clone(),
            image: product.image.clone(),
            ingredients: product.ingredients.join("\n"),
            features: product.features.join("\n"),
            benefits: product.benefits.join("\n"),
        }
    }
}

/// Products page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub products: Vec<ProductRow>,
    pub form: ProductFormView,
}

/// Product edit page template.
#[derive(Template)]
#[template(path = "products/edit.html")]
pub struct ProductEditTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub id: String,
    pub form: ProductFormView,
}

/// Build the products page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products_page).post(create))
        .route("/products/{id}/edit", get(edit_page))
        .route("/products/{id}", post(update))
        .route("/products/{id}/delete", post(delete))
}

/// Submitted create/edit form. Unticked checkboxes are absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub slug: String,
    pub category: String,
    pub in_stock: Option<String>,
    pub tagline: String,
    pub description: String,
    pub how_to_use: String,
    pub packaging: String,
    pub weight: String,
    pub image: String,
    pub ingredients: String,
    pub features: String,
    pub benefits: String,
}

/// One trimmed entry per non-blank line.
fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_price(raw: &str) -> Result<Option<Amount>, AppError> {
    let raw = raw.trim().trim_start_matches('₹');
    if raw.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(raw)
        .map(|d| Some(Amount::new(d)))
        .map_err(|_| AppError::BadRequest(format!("Invalid price: {raw}")))
}

impl ProductForm {
    fn into_new_product(self) -> Result<NewProduct, AppError> {
        Ok(NewProduct {
            price: parse_price(&self.price)?,
            name: Some(self.name.trim().to_string()),
            slug: Some(self.slug.trim().to_string()),
            category: Some(self.category.trim().to_string()),
            in_stock: Some(self.in_stock.is_some()),
            description: Some(self.description),
            how_to_use: Some(self.how_to_use),
            packaging: Some(self.packaging),
            weight: Some(self.weight),
            image: Some(self.image.trim().to_string()),
            tagline: Some(self.tagline),
            ingredients: Some(lines(&self.ingredients)),
            features: Some(lines(&self.features)),
            benefits: Some(lines(&self.benefits)),
        })
    }

    /// Every field of the edit form is written; a blank price keeps the old one.
    fn into_patch(self) -> Result<ProductPatch, AppError> {
        let name = self.name.trim();
        let slug = self.slug.trim();
        if name.is_empty() || slug.is_empty() {
            return Err(AppError::BadRequest(
                "Name and slug cannot be empty".to_string(),
            ));
        }
        Ok(ProductPatch {
            price: parse_price(&self.price)?,
            name: Some(name.to_string()),
            slug: Some(slug.to_string()),
            category: Some(self.category.trim().to_string()).filter(|c| !c.is_empty()),
            in_stock: Some(self.in_stock.is_some()),
            description: Some(self.description),
            how_to_use: Some(self.how_to_use),
            packaging: Some(self.packaging),
            weight: Some(self.weight),
            image: Some(self.image.trim().to_string()),
            tagline: Some(self.tagline),
            ingredients: Some(lines(&self.ingredients)),
            features: Some(lines(&self.features)),
            benefits: Some(lines(&self.benefits)),
        })
    }
}

/// GET /products
#[instrument(skip(_admin, state))]
async fn products_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    let (products, error_message) = match state.store().list_products().await {
        Ok(products) => (products.iter().map(ProductRow::from).collect(), flash.error),
        Err(e) => {
            tracing::error!("Failed to load products: {e}");
            (Vec::new(), Some(AppError::from(e).public_message()))
        }
    };

    render(&ProductsTemplate {
        current_path: "/products".to_string(),
        success_message: flash.success,
        error_message,
        products,
        form: ProductFormView {
            in_stock: true,
            ..ProductFormView::default()
        },
    })
}

/// GET /products/{id}/edit
#[instrument(skip(_admin, state))]
async fn edit_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    match state.store().get_product(&ProductId::new(id.clone())).await {
        Ok(Some(product)) => render(&ProductEditTemplate {
            current_path: "/products".to_string(),
            success_message: flash.success,
            error_message: flash.error,
            id,
            form: ProductFormView::from(&product),
        })
        .into_response(),
        Ok(None) => {
            redirect_error("/products", &AppError::NotFound("Product not found".to_string()))
                .into_response()
        }
        Err(e) => redirect_error("/products", &AppError::from(e)).into_response(),
    }
}

/// POST /products
#[instrument(skip(_admin, state, form))]
async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let result = match form.into_new_product() {
        Ok(body) => create_product(&state, body).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => redirect_success("/products", "Product created"),
        Err(e) => redirect_error("/products", &e),
    }
}

/// POST /products/{id}
#[instrument(skip(_admin, state, form))]
async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let product_id = ProductId::new(id);
    let result = match form.into_patch() {
        Ok(patch) => update_product(&state, &product_id, &patch).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => redirect_success("/products", "Product updated"),
        Err(e) => redirect_error(&format!("/products/{product_id}/edit"), &e),
    }
}

/// POST /products/{id}/delete
#[instrument(skip(_admin, state))]
async fn delete(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    match delete_product(&state, &ProductId::new(id)).await {
        Ok(()) => redirect_success("/products", "Product deleted"),
        Err(e) => redirect_error("/products", &e),
    }
}
