//! Product API handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sareine_core::ProductId;

use super::{ApiJson, SuccessResponse, required};
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::state::AppState;

const MISSING_ID: &str = "Missing product id";

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/products/list", get(list))
        .route("/api/admin/products/create", post(create))
        .route("/api/admin/products/update", post(update))
        .route("/api/admin/products/delete", post(delete))
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct CreateProductResponse {
    pub success: bool,
    pub id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: ProductPatch,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProductRequest {
    #[serde(default)]
    pub id: Option<String>,
}

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => other.into(),
    }
}

pub(crate) async fn create_product(
    state: &AppState,
    body: NewProduct,
) -> Result<ProductId, AppError> {
    let product = body
        .into_product(ProductId::generate(), Utc::now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.store().put_product(&product).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok(product.id)
}

pub(crate) async fn update_product(
    state: &AppState,
    id: &ProductId,
    patch: &ProductPatch,
) -> Result<(), AppError> {
    state
        .store()
        .update_product(id, patch, Utc::now())
        .await
        .map_err(not_found)?;
    tracing::info!(product_id = %id, "Product updated");
    Ok(())
}

pub(crate) async fn delete_product(state: &AppState, id: &ProductId) -> Result<(), AppError> {
    state.store().delete_product(id).await.map_err(not_found)?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(())
}

/// GET /api/admin/products/list
#[instrument(skip(_admin, state))]
async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, AppError> {
    let products = state.store().list_products().await?;
    Ok(Json(ProductsResponse { products }))
}

/// POST /api/admin/products/create
#[instrument(skip(_admin, state))]
async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<Json<CreateProductResponse>, AppError> {
    let id = create_product(&state, body).await?;
    Ok(Json(CreateProductResponse { success: true, id }))
}

/// POST /api/admin/products/update
#[instrument(skip(_admin, state))]
async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = ProductId::new(required(body.id, MISSING_ID)?);
    update_product(&state, &id, &body.patch).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/admin/products/delete
#[instrument(skip(_admin, state))]
async fn delete(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DeleteProductRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = ProductId::new(required(body.id, MISSING_ID)?);
    delete_product(&state, &id).await?;
    Ok(Json(SuccessResponse::ok()))
}
