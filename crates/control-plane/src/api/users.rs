// Users API routes
// Decision: Registration is open; the profile routes act on the caller only

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use planner_core::User;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{service_error, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::services::UserService;
use crate::storage::StorageBackend;

/// Request to register a user record
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Dr. Ada Lovelace")]
    pub name: String,
    /// Reminder emails are delivered to this address.
    #[schema(example = "ada@example.edu")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "Mathematics")]
    pub department: Option<String>,
    #[serde(default)]
    #[schema(example = "B-214")]
    pub office: Option<String>,
}

/// Request to update the caller's profile. Only provided fields will be updated.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Must not belong to another user.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
}

/// App state for users routes
#[derive(Clone)]
pub struct UsersState {
    pub service: Arc<UserService>,
}

impl UsersState {
    pub fn new(db: StorageBackend) -> Self {
        Self {
            service: Arc::new(UserService::new(db)),
        }
    }
}

/// Create users routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/v1/users", post(register_user))
        .route(
            "/v1/profile",
            get(get_profile)
                .put(update_profile)
                .patch(update_profile)
                .delete(delete_profile),
        )
        .with_state(state)
}

/// POST /v1/users - Register a user
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register_user(
    State(state): State<UsersState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .service
        .register(req)
        .await
        .map_err(|e| service_error("Failed to register user", e))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/profile - The caller's profile
#[utoipa::path(
    get,
    path = "/v1/profile",
    params(
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_profile(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .service
        .get(auth.id)
        .await
        .map_err(|e| service_error("Failed to get profile", e))?;

    Ok(Json(user))
}

/// PUT /v1/profile - Update the caller's profile
#[utoipa::path(
    put,
    path = "/v1/profile",
    params(
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<UsersState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .service
        .update(auth.id, req)
        .await
        .map_err(|e| service_error("Failed to update profile", e))?;

    Ok(Json(user))
}

/// DELETE /v1/profile - Delete the caller and all of their events
#[utoipa::path(
    delete,
    path = "/v1/profile",
    params(
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 204, description = "User and events deleted"),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_profile(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete(auth.id)
        .await
        .map_err(|e| service_error("Failed to delete profile", e))?;

    Ok(StatusCode::NO_CONTENT)
}
