// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// This implementation provides a PostgreSQL-compatible API backed by in-memory
// HashMaps, allowing the control-plane to run without a database for development.

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;
use super::StorageError;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    events: RwLock<HashMap<Uuid, EventRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        // Mirrors the unique index on LOWER(email)
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(StorageError::DuplicateEmail.into());
        }

        let now = Self::now();
        let id = Uuid::now_v7();
        let row = UserRow {
            id,
            name: input.name,
            email: input.email,
            department: input.department,
            office: input.office,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if let Some(email) = &input.email {
            if users
                .values()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(StorageError::DuplicateEmail.into());
            }
        }

        if let Some(user) = users.get_mut(&id) {
            if let Some(name) = input.name {
                user.name = name;
            }
            if let Some(email) = input.email {
                user.email = email;
            }
            if let Some(department) = input.department {
                user.department = Some(department);
            }
            if let Some(office) = input.office {
                user.office = Some(office);
            }
            user.updated_at = Self::now();
            return Ok(Some(user.clone()));
        }
        Ok(None)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        // Lock order: users before events, same as every other writer
        let mut users = self.users.write();
        let mut events = self.events.write();
        events.retain(|_, e| e.user_id != id);
        Ok(users.remove(&id).is_some())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = EventRow {
            id,
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            location: input.location,
            event_type: input.event_type,
            start_date: input.start_date,
            end_date: input.end_date,
            notification_sent: false,
            created_at: now,
            updated_at: now,
        };
        self.events.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_event(&self, user_id: Uuid, id: Uuid) -> Result<Option<EventRow>> {
        Ok(self
            .events
            .read()
            .get(&id)
            .filter(|e| e.user_id == user_id)
            .cloned())
    }

    pub async fn list_events(&self, user_id: Uuid) -> Result<Vec<EventRow>> {
        let mut events: Vec<EventRow> = self
            .events
            .read()
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_date);
        Ok(events)
    }

    pub async fn update_event(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: UpdateEvent,
    ) -> Result<Option<EventRow>> {
        let mut events = self.events.write();
        match events.get_mut(&id) {
            Some(event) if event.user_id == user_id => {
                if let Some(title) = input.title {
                    event.title = title;
                }
                if let Some(description) = input.description {
                    event.description = Some(description);
                }
                if let Some(location) = input.location {
                    event.location = Some(location);
                }
                if let Some(event_type) = input.event_type {
                    event.event_type = event_type;
                }
                if let Some(start_date) = input.start_date {
                    event.start_date = start_date;
                }
                if let Some(end_date) = input.end_date {
                    event.end_date = Some(end_date);
                }
                event.updated_at = Self::now();
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    pub async fn delete_event(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let mut events = self.events.write();
        match events.get(&id) {
            Some(event) if event.user_id == user_id => {
                events.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
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
        let users = self.users.read();
        let events = self.events.read();
        Ok(events
            .values()
            .filter(|e| {
                !e.notification_sent && e.start_date >= window_start && e.start_date < window_end
            })
            .filter_map(|e| {
                users.get(&e.user_id).map(|u| PendingNotificationRow {
                    event: e.clone(),
                    owner_email: u.email.clone(),
                })
            })
            .collect())
    }

    pub async fn mark_notification_sent(&self, id: Uuid) -> Result<bool> {
        match self.events.write().get_mut(&id) {
            Some(event) => {
                event.notification_sent = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
