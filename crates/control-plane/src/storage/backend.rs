// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL and migrate it
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Short label for logs and the health endpoint
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "in_memory",
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_user(id).await,
            Self::InMemory(db) => db.delete_user(id).await,
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        match self {
            Self::Postgres(db) => db.create_event(input).await,
            Self::InMemory(db) => db.create_event(input).await,
        }
    }

    pub async fn get_event(&self, user_id: Uuid, id: Uuid) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.get_event(user_id, id).await,
            Self::InMemory(db) => db.get_event(user_id, id).await,
        }
    }

    pub async fn list_events(&self, user_id: Uuid) -> Result<Vec<EventRow>> {
        match self {
            Self::Postgres(db) => db.list_events(user_id).await,
            Self::InMemory(db) => db.list_events(user_id).await,
        }
    }

    pub async fn update_event(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: UpdateEvent,
    ) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.update_event(user_id, id, input).await,
            Self::InMemory(db) => db.update_event(user_id, id, input).await,
        }
    }

    pub async fn delete_event(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_event(user_id, id).await,
            Self::InMemory(db) => db.delete_event(user_id, id).await,
        }
    }

    // ============================================
    // Reminder sweep
    // ============================================

    pub async fn find_pending_notifications(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<PendingNotificationRow>> {
        match self {
            Self::Postgres(db) => db.find_pending_notifications(window_start, window_end).await,
            Self::InMemory(db) => db.find_pending_notifications(window_start, window_end).await,
        }
    }

    pub async fn mark_notification_sent(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.mark_notification_sent(id).await,
            Self::InMemory(db) => db.mark_notification_sent(id).await,
        }
    }
}
