//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod company;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod stats;
pub mod token;
pub mod user;

pub use company::CompanyRepository;
pub use customer::CustomerRepository;
pub use invoice::{
    DEFAULT_NUMBER_RETRY_ATTEMPTS, InvoiceFilter, InvoiceRepository, InvoiceWithItems, ItemChange,
};
pub use product::{BulkUpdateFailure, BulkUpdateOutcome, ProductRepository};
pub use stats::{
    AmountSummary, CategoryCount, CategoryRate, CompanyStats, CustomerStats, InvoiceStats,
    MonthlySummary, ProductStats, StateCount, StatusBreakdown, TOP_CUSTOMERS, TopCustomer,
};
pub use token::TokenRevocationRepository;
pub use user::{CreateUserInput, UserRepository, UserUpdate};

use invoicely_core::directory::DirectoryError;
use invoicely_core::invoice::{Actor, InvoiceError};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, DbErr};

/// `lower(column) LIKE '%needle%'`, portable across backends.
pub(crate) fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

pub(crate) fn invoice_db_error(err: DbErr) -> InvoiceError {
    InvoiceError::Database(err.to_string())
}

pub(crate) fn directory_db_error(err: DbErr) -> DirectoryError {
    DirectoryError::Database(err.to_string())
}

pub(crate) fn require_admin(actor: &Actor) -> Result<(), DirectoryError> {
    if actor.is_admin && actor.is_active {
        Ok(())
    } else {
        Err(DirectoryError::PermissionDenied)
    }
}
