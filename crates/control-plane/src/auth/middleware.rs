// Authentication extractor
//
// Handlers that take an `AuthUser` argument reject requests without a
// usable identity before any storage access happens.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Header carrying the caller's user ID
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Identity of the caller, extracted from request headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// User ID; every owner-scoped query filters on it
    pub id: Uuid,
}

/// Extractor for the caller identity
/// This is required - returns 401 if missing or malformed
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AuthError::unauthorized("Authentication required"))?;

        let id = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| AuthError::unauthorized("Invalid user identity"))?;

        Ok(AuthUser { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<AuthUser, AuthError> {
        let mut builder = Request::builder().uri("/v1/events");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header() {
        let id = Uuid::now_v7();
        let user = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(user.id, id);
    }

    #[tokio::test]
    async fn test_missing_header() {
        let err = extract(None).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error, "Authentication required");
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let err = extract(Some("professor-42")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error, "Invalid user identity");
    }
}
