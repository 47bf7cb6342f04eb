//! HTTP error responses.
//!
//! Every domain error is turned into an [`ApiError`], which renders as
//! `{"error": CODE, "message": ...}` plus `details` for validation failures
//! and `reference_count` for delete guards. Errors a client may simply
//! repeat carry a `Retry-After` header.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use invoicely_core::auth::AuthError;
use invoicely_core::directory::DirectoryError;
use invoicely_core::invoice::InvoiceError;
use invoicely_shared::JwtError;

/// Seconds a client should wait before repeating a retryable request.
const RETRY_AFTER_SECS: u32 = 1;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Vec<String>,
    reference_count: Option<u64>,
    retry_after: Option<u32>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    details: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_count: Option<u64>,
}

impl ApiError {
    /// Creates an error with the given status, code and message.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Vec::new(),
            reference_count: None,
            retry_after: None,
        }
    }

    /// 401 with a custom code.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 500. The message is logged, never returned.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(code = self.code, error = %self.message, "Request failed");
            "An internal error occurred"
        } else {
            self.message.as_str()
        };

        let body = ErrorBody {
            error: self.code,
            message,
            details: &self.details,
            reference_count: self.reference_count,
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        let status = err.status_code();
        let code = err.error_code();
        let retry_after = err.is_retryable().then_some(RETRY_AFTER_SECS);
        let mut api = match err {
            InvoiceError::Validation(details) => {
                Self::from_parts(status, code, "Validation failed".to_string()).with_details(details)
            }
            other => Self::from_parts(status, code, other.to_string()),
        };
        api.retry_after = retry_after;
        api
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        let status = err.status_code();
        let code = err.error_code();
        match err {
            DirectoryError::Validation(details) => {
                Self::from_parts(status, code, "Validation failed".to_string()).with_details(details)
            }
            DirectoryError::InUse {
                reference_count, ..
            } => {
                let mut api = Self::from_parts(status, code, err.to_string());
                api.reference_count = Some(reference_count);
                api
            }
            other => Self::from_parts(status, code, other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = err.status_code();
        let code = err.error_code();
        match err {
            AuthError::Validation(details) => {
                Self::from_parts(status, code, "Validation failed".to_string()).with_details(details)
            }
            other => Self::from_parts(status, code, other.to_string()),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            err.to_string(),
        )
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("TOKEN_EXPIRED", "Token has expired"),
            JwtError::WrongTokenType { .. } => {
                Self::unauthorized("INVALID_TOKEN_TYPE", err.to_string())
            }
            JwtError::DecodingError(_) => {
                Self::unauthorized("INVALID_TOKEN", "Invalid or malformed token")
            }
            JwtError::EncodingError(_) => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_details_survive() {
        let err = ApiError::from(InvoiceError::Validation(vec!["Customer is required".into()]));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.details, vec!["Customer is required".to_string()]);
    }

    #[test]
    fn test_in_use_carries_reference_count() {
        let err = ApiError::from(DirectoryError::InUse {
            entity: "customer",
            referenced_by: "invoices",
            reference_count: 2,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.reference_count, Some(2));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(InvoiceError::invoice_not_found(Uuid::nil()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_allocation_exhaustion_asks_client_to_retry() {
        let response =
            ApiError::from(InvoiceError::NumberAllocationExhausted { attempts: 5 }).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from_static("1"))
        );
    }

    #[test]
    fn test_duplicate_number_is_not_retried() {
        let response =
            ApiError::from(InvoiceError::DuplicateInvoiceNumber("INV-2024-03-0001".into()))
                .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_expired_token() {
        let err = ApiError::from(JwtError::Expired);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "TOKEN_EXPIRED");
    }
}
