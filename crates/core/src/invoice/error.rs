//! Invoice error types.
//!
//! Validation problems are accumulated into a single `Validation` variant so
//! a client sees every field problem at once; everything else is a distinct
//! variant the HTTP layer can map to its own status code.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// One or more field-level problems. Nothing was written.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A date field was not a `YYYY-MM-DD` string.
    #[error("Invalid date format for {field}: {value}")]
    InvalidDate {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value received.
        value: String,
    },

    /// Status value outside DRAFT/SENT/PAID/CANCELLED.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// The invoice, item, or a referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record, e.g. "Invoice".
        entity: &'static str,
        /// The missing id.
        id: Uuid,
    },

    /// The permission gate refused the operation.
    #[error("Permission denied")]
    PermissionDenied,

    /// An explicitly supplied invoice number is already taken.
    #[error("Invoice number {0} already exists")]
    DuplicateInvoiceNumber(String),

    /// Could not allocate a fresh number after repeated collisions.
    #[error("Could not allocate an invoice number after {attempts} attempts")]
    NumberAllocationExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// A line amount or invoice total does not fit the stored precision.
    #[error("Amount exceeds the supported range")]
    AmountOutOfRange,

    /// The month's highest sequence cannot be incremented any further.
    #[error("Malformed invoice number: {0}")]
    MalformedInvoiceNumber(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl InvoiceError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::InvalidDate { .. }
            | Self::InvalidStatus(_)
            | Self::AmountOutOfRange => 400,
            Self::PermissionDenied => 403,
            Self::NotFound { .. } => 404,
            Self::DuplicateInvoiceNumber(_) | Self::NumberAllocationExhausted { .. } => 409,
            Self::MalformedInvoiceNumber(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidDate { .. } => "INVALID_DATE_FORMAT",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::DuplicateInvoiceNumber(_) => "DUPLICATE_INVOICE_NUMBER",
            Self::NumberAllocationExhausted { .. } => "NUMBER_ALLOCATION_EXHAUSTED",
            Self::AmountOutOfRange => "AMOUNT_OUT_OF_RANGE",
            Self::MalformedInvoiceNumber(_) => "MALFORMED_INVOICE_NUMBER",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NumberAllocationExhausted { .. })
    }

    /// Shorthand for a missing invoice.
    #[must_use]
    pub const fn invoice_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Invoice",
            id,
        }
    }

    /// Shorthand for a missing item.
    #[must_use]
    pub const fn item_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "Item", id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(InvoiceError::Validation(vec!["x".into()]), 400, "VALIDATION_ERROR")]
    #[case(InvoiceError::InvalidDate { field: "invoice_date", value: "2024/01/01".into() }, 400, "INVALID_DATE_FORMAT")]
    #[case(InvoiceError::InvalidStatus("DONE".into()), 400, "INVALID_STATUS")]
    #[case(InvoiceError::invoice_not_found(Uuid::nil()), 404, "NOT_FOUND")]
    #[case(InvoiceError::PermissionDenied, 403, "PERMISSION_DENIED")]
    #[case(InvoiceError::DuplicateInvoiceNumber("INV-2024-01-0001".into()), 409, "DUPLICATE_INVOICE_NUMBER")]
    #[case(InvoiceError::NumberAllocationExhausted { attempts: 5 }, 409, "NUMBER_ALLOCATION_EXHAUSTED")]
    #[case(InvoiceError::AmountOutOfRange, 400, "AMOUNT_OUT_OF_RANGE")]
    #[case(InvoiceError::MalformedInvoiceNumber("INV-2024-01-abc".into()), 500, "MALFORMED_INVOICE_NUMBER")]
    #[case(InvoiceError::Database("boom".into()), 500, "DATABASE_ERROR")]
    fn test_status_and_code(#[case] err: InvoiceError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_validation_message_joins_details() {
        let err = InvoiceError::Validation(vec![
            "Invoice date is required".into(),
            "Customer is required".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Invoice date is required; Customer is required"
        );
    }

    #[test]
    fn test_only_allocation_exhaustion_is_retryable() {
        assert!(InvoiceError::NumberAllocationExhausted { attempts: 3 }.is_retryable());
        assert!(!InvoiceError::DuplicateInvoiceNumber("n".into()).is_retryable());
        assert!(!InvoiceError::PermissionDenied.is_retryable());
    }

    #[test]
    fn test_item_not_found_names_entity() {
        let err = InvoiceError::item_not_found(Uuid::nil());
        assert!(err.to_string().starts_with("Item "));
    }
}
