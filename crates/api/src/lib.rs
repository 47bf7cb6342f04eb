//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware and the current-user extractor
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use invoicely_db::{
    CompanyRepository, CustomerRepository, InvoiceRepository, ProductRepository,
    TokenRevocationRepository, UserRepository,
};
use invoicely_shared::JwtService;
use invoicely_shared::config::InvoiceConfig;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Invoice behaviour knobs.
    pub invoice_config: InvoiceConfig,
}

impl AppState {
    /// Creates the state from its parts.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService, invoice_config: InvoiceConfig) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            invoice_config,
        }
    }

    pub(crate) fn users(&self) -> UserRepository {
        UserRepository::new((*self.db).clone())
    }

    pub(crate) fn revocations(&self) -> TokenRevocationRepository {
        TokenRevocationRepository::new((*self.db).clone())
    }

    pub(crate) fn companies(&self) -> CompanyRepository {
        CompanyRepository::new((*self.db).clone())
    }

    pub(crate) fn customers(&self) -> CustomerRepository {
        CustomerRepository::new((*self.db).clone())
    }

    pub(crate) fn products(&self) -> ProductRepository {
        ProductRepository::new((*self.db).clone())
    }

    pub(crate) fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new((*self.db).clone())
            .with_number_retry_attempts(self.invoice_config.number_retry_attempts)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
