//! Invoice routes: the aggregate, its items, numbering and statistics.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{MessageResponse, SearchQuery, SearchResponse, page_request, parse_status, today};
use crate::{AppState, error::ApiResult, middleware::auth::CurrentUser};
use invoicely_core::invoice::{
    InvoiceInput, InvoicePatch, InvoiceTotals, ItemPatch, ItemSpec, parse_date,
};
use invoicely_db::entities::{invoice_items, invoices};
use invoicely_db::{InvoiceFilter, InvoiceStats, InvoiceWithItems, ItemChange};
use invoicely_shared::types::PageResponse;

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/next-number", get(next_number))
        .route("/invoices/stats", get(invoice_stats))
        .route("/invoices/search", get(search_invoices))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/items", get(list_items).post(add_item))
        .route(
            "/invoices/{id}/items/{item_id}",
            put(update_item).delete(remove_item),
        )
        .route("/invoices/{id}/calculate", post(recalculate))
        .route("/invoices/{id}/status", put(update_status))
        .route("/invoices/{id}/duplicate", post(duplicate_invoice))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// DRAFT, SENT, PAID or CANCELLED.
    pub status: Option<String>,
    /// Billed customer.
    pub customer_id: Option<Uuid>,
    /// Issuing company.
    pub company_id: Option<Uuid>,
    /// Earliest invoice date, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Latest invoice date, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Query parameters for statistics.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Calendar year; defaults to the current one.
    pub year: Option<i32>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// The new status.
    pub status: String,
}

/// The number the next auto-numbered invoice would get.
#[derive(Debug, Serialize)]
pub struct NextNumberResponse {
    /// Formatted invoice number.
    pub invoice_number: String,
}

/// Totals after an item was removed.
#[derive(Debug, Serialize)]
pub struct RemoveItemResponse {
    /// Acknowledgement.
    pub message: String,
    /// Refreshed invoice totals.
    pub totals: InvoiceTotals,
}

async fn list_invoices(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListInvoicesQuery>,
) -> ApiResult<Json<PageResponse<invoices::Model>>> {
    let filter = InvoiceFilter {
        status: parse_status(query.status.as_deref())?,
        customer_id: query.customer_id,
        company_id: query.company_id,
        date_from: parse_date("date_from", query.date_from.as_deref())?,
        date_to: parse_date("date_to", query.date_to.as_deref())?,
    };
    let page = page_request(query.page, query.per_page);

    Ok(Json(state.invoices().list(&filter, &page).await?))
}

async fn create_invoice(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<InvoiceInput>,
) -> ApiResult<(StatusCode, Json<InvoiceWithItems>)> {
    let created = state
        .invoices()
        .create(&current.actor(), input, today())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn next_number(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<NextNumberResponse>> {
    let invoice_number = state.invoices().next_number(today()).await?;
    Ok(Json(NextNumberResponse { invoice_number }))
}

async fn invoice_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<InvoiceStats>> {
    let year = query.year.unwrap_or_else(|| today().year());
    Ok(Json(state.invoices().stats(year).await?))
}

async fn search_invoices(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse<invoices::Model>>> {
    let data = state.invoices().search(&query.q).await?;
    Ok(Json(SearchResponse {
        data,
        query: query.q,
    }))
}

async fn get_invoice(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InvoiceWithItems>> {
    Ok(Json(state.invoices().get(id).await?))
}

async fn update_invoice(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<InvoicePatch>,
) -> ApiResult<Json<InvoiceWithItems>> {
    Ok(Json(
        state
            .invoices()
            .update(&current.actor(), id, patch, today())
            .await?,
    ))
}

async fn delete_invoice(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.invoices().delete(&current.actor(), id).await?;
    Ok(Json(MessageResponse::new("Invoice deleted successfully")))
}

async fn list_items(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<invoice_items::Model>>> {
    Ok(Json(state.invoices().list_items(id).await?))
}

async fn add_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(spec): Json<ItemSpec>,
) -> ApiResult<(StatusCode, Json<ItemChange>)> {
    let change = state
        .invoices()
        .add_item(&current.actor(), id, spec)
        .await?;
    Ok((StatusCode::CREATED, Json(change)))
}

async fn update_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<Json<ItemChange>> {
    Ok(Json(
        state
            .invoices()
            .update_item(&current.actor(), id, item_id, patch)
            .await?,
    ))
}

async fn remove_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RemoveItemResponse>> {
    let totals = state
        .invoices()
        .remove_item(&current.actor(), id, item_id)
        .await?;
    Ok(Json(RemoveItemResponse {
        message: "Item deleted successfully".to_string(),
        totals,
    }))
}

/// POST /invoices/{id}/calculate - Recompute stored amounts and totals.
async fn recalculate(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InvoiceWithItems>> {
    Ok(Json(state.invoices().recalculate(id).await?))
}

/// PUT /invoices/{id}/status - Any status, any time, any active user.
async fn update_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<invoices::Model>> {
    let invoice = state.invoices().update_status(id, &payload.status).await?;
    info!(invoice_id = %id, user_id = %current.user.id, status = %payload.status, "Status changed via API");
    Ok(Json(invoice))
}

async fn duplicate_invoice(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<InvoiceWithItems>)> {
    let copy = state
        .invoices()
        .duplicate(&current.actor(), id, today())
        .await?;
    Ok((StatusCode::CREATED, Json(copy)))
}
