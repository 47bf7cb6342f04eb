//! Company routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::{MessageResponse, SearchQuery, SearchResponse, StatusPageQuery, ValidationReport};
use crate::{AppState, error::ApiResult, middleware::auth::CurrentUser};
use invoicely_core::directory::{CompanyFields, CompanyPatch};
use invoicely_db::CompanyStats;
use invoicely_db::entities::{companies, invoices};
use invoicely_shared::types::{PageRequest, PageResponse};

/// Creates the company routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/search", get(search_companies))
        .route("/companies/stats", get(company_stats))
        .route(
            "/companies/{id}",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/companies/{id}/validate", post(validate_company))
        .route("/companies/{id}/invoices", get(company_invoices))
}

async fn list_companies(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<companies::Model>>> {
    Ok(Json(state.companies().list(&page).await?))
}

async fn search_companies(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse<companies::Model>>> {
    let data = state.companies().search(&query.q).await?;
    Ok(Json(SearchResponse {
        data,
        query: query.q,
    }))
}

async fn company_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<CompanyStats>> {
    Ok(Json(state.companies().stats().await?))
}

async fn get_company(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<companies::Model>> {
    Ok(Json(state.companies().get(id).await?))
}

async fn create_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(fields): Json<CompanyFields>,
) -> ApiResult<(StatusCode, Json<companies::Model>)> {
    let company = state.companies().create(&current.actor(), fields).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

async fn update_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<CompanyPatch>,
) -> ApiResult<Json<companies::Model>> {
    Ok(Json(
        state
            .companies()
            .update(&current.actor(), id, &patch)
            .await?,
    ))
}

async fn delete_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.companies().delete(&current.actor(), id).await?;
    Ok(Json(MessageResponse::new("Company deleted successfully")))
}

/// POST /companies/{id}/validate - Re-run field validation on the stored row.
async fn validate_company(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ValidationReport>> {
    let company = state.companies().get(id).await?;
    Ok(Json(company.fields().validate().into()))
}

async fn company_invoices(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusPageQuery>,
) -> ApiResult<Json<PageResponse<invoices::Model>>> {
    let status = query.status()?;
    Ok(Json(
        state
            .companies()
            .invoices(id, status, &query.page())
            .await?,
    ))
}
