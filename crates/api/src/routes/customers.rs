//! Customer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::{MessageResponse, SearchQuery, SearchResponse, StatusPageQuery, ValidationReport};
use crate::{AppState, error::ApiResult, middleware::auth::CurrentUser};
use invoicely_core::directory::{CustomerFields, CustomerPatch};
use invoicely_db::CustomerStats;
use invoicely_db::entities::{customers, invoices};
use invoicely_shared::types::{PageRequest, PageResponse};

/// Creates the customer routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/search", get(search_customers))
        .route("/customers/stats", get(customer_stats))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/customers/{id}/validate", post(validate_customer))
        .route("/customers/{id}/invoices", get(customer_invoices))
}

async fn list_customers(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<customers::Model>>> {
    Ok(Json(state.customers().list(&page).await?))
}

async fn search_customers(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse<customers::Model>>> {
    let data = state.customers().search(&query.q).await?;
    Ok(Json(SearchResponse {
        data,
        query: query.q,
    }))
}

async fn customer_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<CustomerStats>> {
    Ok(Json(state.customers().stats().await?))
}

async fn get_customer(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<customers::Model>> {
    Ok(Json(state.customers().get(id).await?))
}

async fn create_customer(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(fields): Json<CustomerFields>,
) -> ApiResult<(StatusCode, Json<customers::Model>)> {
    let customer = state.customers().create(fields).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<CustomerPatch>,
) -> ApiResult<Json<customers::Model>> {
    Ok(Json(state.customers().update(id, &patch).await?))
}

async fn delete_customer(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.customers().delete(&current.actor(), id).await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}

async fn validate_customer(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ValidationReport>> {
    let customer = state.customers().get(id).await?;
    Ok(Json(customer.fields().validate().into()))
}

async fn customer_invoices(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusPageQuery>,
) -> ApiResult<Json<PageResponse<invoices::Model>>> {
    let status = query.status()?;
    Ok(Json(
        state
            .customers()
            .invoices(id, status, &query.page())
            .await?,
    ))
}
