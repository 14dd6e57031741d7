// Calendar event domain types
//
// These types represent the Event entity owned by a user.
// Used by both the API and the reminder sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Kind of calendar entry.
/// - `class`: A lecture or lab session
/// - `meeting`: A meeting with colleagues or students
/// - `office_hours`: Scheduled office hours
/// - `deadline`: A due date
/// - `other`: Anything else
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A lecture or lab session.
    Class,
    /// A meeting with colleagues or students.
    Meeting,
    /// Scheduled office hours.
    OfficeHours,
    /// A due date.
    Deadline,
    /// Anything else.
    #[default]
    Other,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Class => write!(f, "class"),
            EventType::Meeting => write!(f, "meeting"),
            EventType::OfficeHours => write!(f, "office_hours"),
            EventType::Deadline => write!(f, "deadline"),
            EventType::Other => write!(f, "other"),
        }
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "class" => EventType::Class,
            "meeting" => EventType::Meeting,
            "office_hours" => EventType::OfficeHours,
            "deadline" => EventType::Deadline,
            _ => EventType::Other,
        }
    }
}

/// Event - a calendar entry owned by a single user.
///
/// `notification_sent` is written only by the reminder sweep. API requests
/// never carry it, so editing `start_date` after a reminder went out does
/// not re-arm the reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// ID of the user who owns the event and receives its reminder.
    pub user_id: Uuid,
    /// Short title shown in the calendar and in the reminder subject.
    pub title: String,
    /// Longer free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the event takes place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Kind of calendar entry.
    pub event_type: EventType,
    /// Instant the event begins. The reminder sweep filters on this field.
    pub start_date: DateTime<Utc>,
    /// Instant the event ends, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Whether the two-day reminder has been sent.
    pub notification_sent: bool,
    /// Timestamp when the event was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the event was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Location to show in reminders, with the placeholder used when unset.
    pub fn display_location(&self) -> &str {
        match self.location.as_deref() {
            Some(location) if !location.trim().is_empty() => location,
            _ => "Not specified",
        }
    }
}
