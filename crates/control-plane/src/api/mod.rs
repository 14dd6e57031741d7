// HTTP API routes
//
// This module contains all HTTP route handlers for the public API.
// Each submodule handles a specific resource type with its own AppState.

pub mod common;
pub mod events;
pub mod users;

use axum::Router;

use crate::storage::StorageBackend;

// Re-export common types
pub use common::{ErrorResponse, ListResponse};

/// All `/v1` routes backed by the given storage
pub fn routes(db: StorageBackend) -> Router {
    Router::new()
        .merge(events::routes(events::AppState::new(db.clone())))
        .merge(users::routes(users::UsersState::new(db)))
}

/// Build router with optional API prefix
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
