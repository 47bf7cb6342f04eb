//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories for the invoice aggregate and its reference data
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use migration::Migrator;
pub use repositories::{
    BulkUpdateFailure, BulkUpdateOutcome, CompanyRepository, CompanyStats, CreateUserInput, CustomerRepository, CustomerStats,
    InvoiceFilter, InvoiceRepository, InvoiceStats, InvoiceWithItems, ItemChange,
    ProductRepository, ProductStats, TokenRevocationRepository, UserRepository, UserUpdate,
};

use invoicely_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    tracing::debug!(
        max_connections = config.max_connections,
        "Connecting to database"
    );
    Database::connect(options).await
}
