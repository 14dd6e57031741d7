// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use planner_core::{Event, EventType, PendingNotification, User};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub office: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub office: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub office: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            department: row.department,
            office: row.office,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateEventRow {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Owner-editable event fields. `notification_sent` is not among them.
#[derive(Debug, Clone, Default)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            location: row.location,
            event_type: EventType::from(row.event_type.as_str()),
            start_date: row.start_date,
            end_date: row.end_date,
            notification_sent: row.notification_sent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Event joined with its owner's address, as loaded by the reminder sweep
#[derive(Debug, Clone, FromRow)]
pub struct PendingNotificationRow {
    #[sqlx(flatten)]
    pub event: EventRow,
    pub owner_email: String,
}

impl From<PendingNotificationRow> for PendingNotification {
    fn from(row: PendingNotificationRow) -> Self {
        PendingNotification {
            event: row.event.into(),
            owner_email: row.owner_email,
        }
    }
}
