//! Errors for companies, customers and products.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while managing directory records.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// One or more field-level problems. Nothing was written.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// "Company", "Customer" or "Product".
        entity: &'static str,
        /// The missing id.
        id: Uuid,
    },

    /// The record is still referenced by invoices or invoice items.
    #[error("Cannot delete {entity} with {reference_count} associated {referenced_by}")]
    InUse {
        /// "company", "customer" or "product".
        entity: &'static str,
        /// What holds the references, e.g. "invoices".
        referenced_by: &'static str,
        /// Number of blocking references.
        reference_count: u64,
    },

    /// Only administrators may delete directory records.
    #[error("Admin access required")]
    PermissionDenied,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DirectoryError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::PermissionDenied => 403,
            Self::NotFound { .. } => 404,
            Self::InUse { .. } => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InUse { .. } => "IN_USE",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Turns a list of problems into `Ok(())` or a validation error.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Validation` if `errors` is not empty.
    pub fn check(errors: Vec<String>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(errors))
        }
    }
}
