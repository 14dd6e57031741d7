// OpenAPI specification generation
//
// This module defines the OpenAPI spec for the Professor Planner API.
// It can be used by both the main API server (for Swagger UI)
// and the export-openapi binary (for static spec generation).

use crate::api;
use crate::api::{ErrorResponse, ListResponse};
use planner_core::{Event, EventType, User};
use utoipa::OpenApi;

/// OpenAPI documentation for the Professor Planner API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::events::list_events,
        api::events::create_event,
        api::events::get_event,
        api::events::update_event,
        api::events::delete_event,
        api::users::register_user,
        api::users::get_profile,
        api::users::update_profile,
        api::users::delete_profile,
    ),
    components(
        schemas(
            Event, EventType, User,
            api::events::CreateEventRequest, api::events::UpdateEventRequest,
            api::users::CreateUserRequest, api::users::UpdateProfileRequest,
            ListResponse<Event>,
            ErrorResponse,
        )
    ),
    tags(
        (name = "events", description = "Calendar events owned by the caller"),
        (name = "users", description = "User registration and the caller's profile")
    ),
    info(
        title = "Professor Planner API",
        version = "0.1.0",
        description = "API for managing calendar events and the profile that receives event reminders",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}
