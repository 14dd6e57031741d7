// Event service for business logic
//
// Every operation is scoped by the owner taken from the request identity.
// An event owned by someone else is reported exactly like a missing one.

use crate::api::events::{CreateEventRequest, UpdateEventRequest};
use crate::storage::{
    models::{CreateEventRow, UpdateEvent},
    StorageBackend,
};
use chrono::{DateTime, Utc};
use planner_core::Event;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};

pub struct EventService {
    db: StorageBackend,
}

impl EventService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner: Uuid, req: CreateEventRequest) -> ServiceResult<Event> {
        let title = validate_title(&req.title)?;
        validate_dates(req.start_date, req.end_date)?;

        if self.db.get_user(owner).await?.is_none() {
            return Err(ServiceError::NotFound("User"));
        }

        let input = CreateEventRow {
            user_id: owner,
            title,
            description: req.description,
            location: req.location,
            event_type: req.event_type.unwrap_or_default().to_string(),
            start_date: req.start_date,
            end_date: req.end_date,
        };
        let row = self.db.create_event(input).await?;
        tracing::debug!(event_id = %row.id, user_id = %owner, "Event created");

        Ok(row.into())
    }

    pub async fn list(&self, owner: Uuid) -> ServiceResult<Vec<Event>> {
        let rows = self.db.list_events(owner).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> ServiceResult<Event> {
        self.db
            .get_event(owner, id)
            .await?
            .map(Event::from)
            .ok_or(ServiceError::NotFound("Event"))
    }

    /// Apply the provided fields. `notification_sent` is never touched, so
    /// moving an already-reminded event does not schedule a second reminder.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        req: UpdateEventRequest,
    ) -> ServiceResult<Event> {
        let existing = self.get(owner, id).await?;

        let title = req.title.as_deref().map(validate_title).transpose()?;
        validate_dates(
            req.start_date.unwrap_or(existing.start_date),
            req.end_date.or(existing.end_date),
        )?;

        let input = UpdateEvent {
            title,
            description: req.description,
            location: req.location,
            event_type: req.event_type.map(|t| t.to_string()),
            start_date: req.start_date,
            end_date: req.end_date,
        };

        self.db
            .update_event(owner, id, input)
            .await?
            .map(Event::from)
            .ok_or(ServiceError::NotFound("Event"))
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> ServiceResult<()> {
        if self.db.delete_event(owner, id).await? {
            tracing::debug!(event_id = %id, user_id = %owner, "Event deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound("Event"))
        }
    }
}

fn validate_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::validation("Title is required"));
    }
    Ok(title.to_string())
}

fn validate_dates(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ServiceResult<()> {
    match end {
        Some(end) if end < start => Err(ServiceError::validation(
            "End date must not be before start date",
        )),
        _ => Ok(()),
    }
}
