//! API route definitions.

use axum::{Router, middleware};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppState, middleware::auth::auth_middleware};
use invoicely_core::invoice::{InvoiceError, InvoiceStatus};
use invoicely_shared::types::PageRequest;

pub mod auth;
pub mod companies;
pub mod customers;
pub mod health;
pub mod invoices;
pub mod products;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(companies::routes())
        .merge(customers::routes())
        .merge(products::routes())
        .merge(invoices::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected_routes)
}

/// The calendar date used for defaults and "future date" checks.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `?q=` for the search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text query; blank yields no results.
    #[serde(default)]
    pub q: String,
}

/// Search results echoed with the query that produced them.
#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    /// Matching records.
    pub data: Vec<T>,
    /// The query as received.
    pub query: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of re-validating a stored record.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// True when `errors` is empty.
    pub valid: bool,
    /// Every problem found.
    pub errors: Vec<String>,
}

impl From<Vec<String>> for ValidationReport {
    fn from(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// `?status=&page=&per_page=` for the invoice listings.
///
/// Page fields are spelled out instead of flattening [`PageRequest`]:
/// flattened numbers do not survive query-string decoding.
#[derive(Debug, Default, Deserialize)]
pub struct StatusPageQuery {
    /// Only invoices in this status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl StatusPageQuery {
    pub(crate) fn status(&self) -> Result<Option<InvoiceStatus>, InvoiceError> {
        parse_status(self.status.as_deref())
    }

    pub(crate) fn page(&self) -> PageRequest {
        page_request(self.page, self.per_page)
    }
}

pub(crate) fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(defaults.page),
        per_page: per_page.unwrap_or(defaults.per_page),
    }
}

/// Blank means "no filter"; anything else must be a known status.
pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<InvoiceStatus>, InvoiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => InvoiceStatus::parse(s)
            .map(Some)
            .ok_or_else(|| InvoiceError::InvalidStatus(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("PAID"), Some(InvoiceStatus::Paid))]
    fn test_parse_status(#[case] raw: Option<&str>, #[case] expected: Option<InvoiceStatus>) {
        assert_eq!(parse_status(raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_status_rejects_unknown() {
        assert!(matches!(
            parse_status(Some("DONE")),
            Err(InvoiceError::InvalidStatus(s)) if s == "DONE"
        ));
    }

    #[test]
    fn test_page_request_defaults() {
        let page = page_request(None, Some(25));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 25);
    }
}
