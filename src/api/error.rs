//! Storefront error responses.
//!
//! Every failure is rendered as `{ "code": …, "message": … }`. The codes:
//!
//! - `VALIDATION_ERROR` (400): a missing or out-of-range field, an empty
//!   order or an unknown order status. Carries `details` per field when
//!   one field is at fault.
//! - `INVALID_REQUEST` (400): a body, query or form that could not be
//!   decoded at all.
//! - `INVALID_ID` (400): a path id that is not a 24-hex object id.
//! - `UNAUTHORIZED` (401) and `FORBIDDEN` (403): missing token, unknown
//!   token, or a non-admin caller on an admin route.
//! - `NOT_FOUND` (404): a well-formed id with no stored record.
//! - `PERSISTENCE_ERROR` (400): a store failure during product create or
//!   update, reported with the store's message.
//! - `UPLOAD_ERROR` (400): the media host refused the product image.
//! - `INTERNAL_ERROR` (500): any other store failure.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::{RepositoryError, UploadError};

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional field-level errors for validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error with field-level details.
    #[must_use]
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Field-level error for validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new(code, message))
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation(message, details),
        )
    }

    /// Creates a 400 Bad Request response for a malformed identifier.
    #[must_use]
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::bad_request("INVALID_ID", message)
    }

    /// Creates a 401 Unauthorized response.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHORIZED", message),
        )
    }

    /// Creates a 403 Forbidden response.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", message))
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }

    /// Re-labels a server-side failure as 400, keeping its message.
    ///
    /// Product create and update report store failures this way.
    #[must_use]
    pub fn into_bad_request(self) -> Self {
        if self.status.is_server_error() {
            Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("PERSISTENCE_ERROR", self.error.message),
            )
        } else {
            self
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => Self::not_found(message),
            RepositoryError::DatabaseError(_) | RepositoryError::SerializationError(_) => {
                tracing::error!(%error, "Repository operation failed");
                Self::internal_error(error.to_string())
            }
        }
    }
}

impl From<DomainError> for ApiErrorResponse {
    fn from(error: DomainError) -> Self {
        let message = error.to_string();
        match error {
            DomainError::InvalidIdentifier { .. } => Self::invalid_id(message),
            DomainError::MissingField(field) => {
                Self::validation_error(message, vec![FieldError::new(field, "is required")])
            }
            DomainError::InvalidField {
                field,
                message: reason,
            } => Self::validation_error(message, vec![FieldError::new(field, reason)]),
            DomainError::EmptyOrder | DomainError::InvalidStatus(_) => {
                Self::bad_request("VALIDATION_ERROR", message)
            }
        }
    }
}

impl From<UploadError> for ApiErrorResponse {
    fn from(error: UploadError) -> Self {
        tracing::error!(%error, "Media upload failed");
        Self::bad_request("UPLOAD_ERROR", error.to_string())
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("INVALID_REQUEST", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("INVALID_REQUEST", rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiErrorResponse {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request("INVALID_REQUEST", rejection.body_text())
    }
}

impl From<MultipartError> for ApiErrorResponse {
    fn from(error: MultipartError) -> Self {
        Self::bad_request("INVALID_REQUEST", error.body_text())
    }
}
