// Common DTOs for public API
//
// These types are shared across multiple API endpoints.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::ServiceError;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a service error to a status code and body.
/// Internal errors are logged with `context` and never echoed to the client.
pub fn service_error(context: &str, e: ServiceError) -> ApiError {
    match e {
        ServiceError::NotFound(_) => {
            ErrorResponse::new(e.to_string()).into_response(StatusCode::NOT_FOUND)
        }
        ServiceError::Validation(msg) => {
            ErrorResponse::new(msg).into_response(StatusCode::BAD_REQUEST)
        }
        ServiceError::Conflict(msg) => ErrorResponse::new(msg).into_response(StatusCode::CONFLICT),
        ServiceError::Internal(e) => {
            tracing::error!("{}: {:#}", context, e);
            ErrorResponse::new("Internal server error")
                .into_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
