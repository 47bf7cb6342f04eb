//! Product catalogue routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MessageResponse, SearchQuery, SearchResponse, ValidationReport, page_request};
use crate::{AppState, error::ApiResult, middleware::auth::CurrentUser};
use invoicely_core::directory::{DirectoryError, ProductFields, ProductPatch, ProductUpdate};
use invoicely_db::entities::products;
use invoicely_db::{BulkUpdateFailure, ProductStats};
use invoicely_shared::types::PageResponse;

/// Creates the product routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/stats", get(product_stats))
        .route("/products/bulk-update", post(bulk_update_products))
        .route("/products/categories", get(list_categories))
        .route("/products/categories/{name}", get(products_in_category))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/validate", post(validate_product))
}

/// Query parameters for listing products.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    /// Only this category.
    pub category: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Distinct product categories.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    /// Sorted category names.
    pub categories: Vec<String>,
}

/// Products of one category.
#[derive(Debug, Serialize)]
pub struct CategoryProductsResponse {
    /// The category asked for.
    pub category: String,
    /// Its products, by name.
    pub products: Vec<products::Model>,
}

/// Body of a bulk product update.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    /// Entries to apply, each `{"id": ..., <fields to change>}`.
    pub products: Option<Vec<ProductUpdate>>,
}

/// Outcome of a bulk product update.
#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    /// Human-readable summary.
    pub message: String,
    /// Products written.
    pub updated_count: u64,
    /// Entries skipped, with their reasons.
    pub errors: Vec<BulkUpdateFailure>,
}

async fn list_products(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Json<PageResponse<products::Model>>> {
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let page = page_request(query.page, query.per_page);
    Ok(Json(state.products().list(category, &page).await?))
}

async fn search_products(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse<products::Model>>> {
    let data = state.products().search(&query.q).await?;
    Ok(Json(SearchResponse {
        data,
        query: query.q,
    }))
}

async fn list_categories(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<CategoriesResponse>> {
    let categories = state.products().categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

async fn products_in_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(category): Path<String>,
) -> ApiResult<Json<CategoryProductsResponse>> {
    let products = state.products().by_category(&category).await?;
    Ok(Json(CategoryProductsResponse { category, products }))
}

async fn product_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<ProductStats>> {
    Ok(Json(state.products().stats().await?))
}

/// POST /products/bulk-update - Admin only. Invalid entries are reported
/// per product; the valid ones are still written.
async fn bulk_update_products(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<BulkUpdateRequest>,
) -> ApiResult<Json<BulkUpdateResponse>> {
    current.require_admin()?;
    let Some(updates) = payload.products else {
        return Err(DirectoryError::Validation(vec!["No products data provided".to_string()]).into());
    };

    let outcome = state
        .products()
        .bulk_update(&current.actor(), &updates)
        .await?;

    Ok(Json(BulkUpdateResponse {
        message: format!("Successfully updated {} products", outcome.updated_count),
        updated_count: outcome.updated_count,
        errors: outcome.errors,
    }))
}

async fn get_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<products::Model>> {
    Ok(Json(state.products().get(id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(fields): Json<ProductFields>,
) -> ApiResult<(StatusCode, Json<products::Model>)> {
    let product = state.products().create(fields).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<products::Model>> {
    Ok(Json(state.products().update(id, &patch).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.products().delete(&current.actor(), id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

async fn validate_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ValidationReport>> {
    let product = state.products().get(id).await?;
    Ok(Json(product.fields().validate().into()))
}
