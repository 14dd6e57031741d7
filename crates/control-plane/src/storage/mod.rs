// Storage layer for the Professor Planner control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// StorageBackend also implements planner_core::NotificationStore so the
// reminder sweep runs against whichever backend the server was started with.

pub mod backend;
pub mod memory;
pub mod models;
pub mod notification_store;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::*;

/// Storage failures callers need to tell apart from generic database errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("email address already in use")]
    DuplicateEmail,
}
