// Event CRUD HTTP routes
//
// All routes are owner-scoped through the AuthUser extractor.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use planner_core::{Event, EventType};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{service_error, ApiError, ErrorResponse, ListResponse};
use crate::auth::AuthUser;
use crate::services::EventService;
use crate::storage::StorageBackend;

/// Request to create a new event
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Short title. Shown in the calendar and in the reminder subject.
    #[schema(example = "Faculty meeting")]
    pub title: String,
    /// Longer free-form description.
    #[serde(default)]
    #[schema(example = "Budget review for next semester")]
    pub description: Option<String>,
    /// Where the event takes place.
    #[serde(default)]
    #[schema(example = "Room 204")]
    pub location: Option<String>,
    /// Kind of calendar entry. Defaults to `other`.
    #[serde(default)]
    pub event_type: Option<EventType>,
    /// Instant the event begins.
    pub start_date: DateTime<Utc>,
    /// Instant the event ends. Must not be before `start_date`.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Request to update an event. Only provided fields will be updated.
/// The reminder flag is not part of the request and cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    #[serde(default)]
    #[schema(example = "Rescheduled faculty meeting")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// App state for events routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EventService>,
}

impl AppState {
    pub fn new(db: StorageBackend) -> Self {
        Self {
            service: Arc::new(EventService::new(db)),
        }
    }
}

/// Create event routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events", get(list_events).post(create_event))
        .route(
            "/v1/events/:event_id",
            get(get_event)
                .put(update_event)
                .patch(update_event)
                .delete(delete_event),
        )
        .with_state(state)
}

/// GET /v1/events - List the caller's events by start date
#[utoipa::path(
    get,
    path = "/v1/events",
    params(
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "List of events", body = ListResponse<Event>),
        (status = 401, description = "Missing or invalid identity"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListResponse<Event>>, ApiError> {
    let events = state
        .service
        .list(auth.id)
        .await
        .map_err(|e| service_error("Failed to list events", e))?;

    Ok(Json(ListResponse::new(events)))
}

/// POST /v1/events - Create an event
#[utoipa::path(
    post,
    path = "/v1/events",
    params(
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "No user record for the identity", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state
        .service
        .create(auth.id, req)
        .await
        .map_err(|e| service_error("Failed to create event", e))?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /v1/events/{event_id} - Get one of the caller's events
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .service
        .get(auth.id, event_id)
        .await
        .map_err(|e| service_error("Failed to get event", e))?;

    Ok(Json(event))
}

/// PATCH /v1/events/{event_id} - Update an event
#[utoipa::path(
    patch,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .service
        .update(auth.id, event_id, req)
        .await
        .map_err(|e| service_error("Failed to update event", e))?;

    Ok(Json(event))
}

/// DELETE /v1/events/{event_id} - Delete an event
#[utoipa::path(
    delete,
    path = "/v1/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        ("X-User-Id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete(auth.id, event_id)
        .await
        .map_err(|e| service_error("Failed to delete event", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateEventRequest = serde_json::from_str(
            r#"{"title": "Lab", "start_date": "2026-05-01T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.title, "Lab");
        assert!(req.event_type.is_none());
        assert!(req.end_date.is_none());
    }

    #[test]
    fn test_update_request_ignores_notification_flag() {
        let req: UpdateEventRequest =
            serde_json::from_str(r#"{"notification_sent": false, "location": "Hall C"}"#)
                .unwrap();
        assert_eq!(req.location.as_deref(), Some("Hall C"));
        assert!(req.start_date.is_none());
    }
}
