// In-memory implementations for dev mode and testing
//
// These implementations keep all data in memory, making them useful for:
// - Unit tests of the sweep and the scheduler
// - Running the sweep without a database or an SMTP relay
//
// Both types can be told to fail on purpose so tests can exercise the
// sweep's error isolation.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NotificationError, Result};
use crate::event::Event;
use crate::reminder::{NotificationWindow, OutgoingEmail};
use crate::traits::{Mailer, NotificationStore, PendingNotification};

// ============================================================================
// InMemoryNotificationStore
// ============================================================================

/// In-memory event store
///
/// Stores events keyed by ID and owner addresses keyed by user ID.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationStore {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    owner_emails: Arc<RwLock<HashMap<Uuid, String>>>,
    query_failure: Arc<RwLock<Option<String>>>,
    failing_marks: Arc<RwLock<HashSet<Uuid>>>,
    query_stall: Arc<RwLock<Option<Duration>>>,
    mark_stall: Arc<RwLock<Option<Duration>>>,
}

impl InMemoryNotificationStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the address reminders for `user_id` are sent to
    pub async fn add_owner(&self, user_id: Uuid, email: impl Into<String>) {
        self.owner_emails.write().await.insert(user_id, email.into());
    }

    /// Pre-populate with an event (useful for testing)
    pub async fn seed(&self, event: Event) {
        self.events.write().await.insert(event.id, event);
    }

    /// Get an event by ID
    pub async fn get(&self, id: Uuid) -> Option<Event> {
        self.events.read().await.get(&id).cloned()
    }

    /// Apply an owner edit to an event (start date only, flag untouched)
    pub async fn reschedule(&self, id: Uuid, start_date: chrono::DateTime<chrono::Utc>) {
        if let Some(event) = self.events.write().await.get_mut(&id) {
            event.start_date = start_date;
            event.updated_at = chrono::Utc::now();
        }
    }

    /// Make every query fail with `message` until cleared with `None`
    pub async fn set_query_failure(&self, message: Option<&str>) {
        *self.query_failure.write().await = message.map(String::from);
    }

    /// Make flag writes for `event_id` fail
    pub async fn fail_marks_for(&self, event_id: Uuid) {
        self.failing_marks.write().await.insert(event_id);
    }

    /// Hold every query for `delay` before answering
    pub async fn stall_queries(&self, delay: Duration) {
        *self.query_stall.write().await = Some(delay);
    }

    /// Hold every flag write for `delay` before applying it
    pub async fn stall_marks(&self, delay: Duration) {
        *self.mark_stall.write().await = Some(delay);
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn find_pending_notifications(
        &self,
        window: &NotificationWindow,
    ) -> Result<Vec<PendingNotification>> {
        let stall = *self.query_stall.read().await;
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.query_failure.read().await.clone() {
            return Err(NotificationError::store(message));
        }

        let events = self.events.read().await;
        let owners = self.owner_emails.read().await;
        let mut pending = Vec::new();
        for event in events.values() {
            if event.notification_sent || !window.contains(event.start_date) {
                continue;
            }
            // Events without a resolvable owner are skipped, like a failed join
            if let Some(email) = owners.get(&event.user_id) {
                pending.push(PendingNotification {
                    event: event.clone(),
                    owner_email: email.clone(),
                });
            }
        }
        Ok(pending)
    }

    async fn mark_notification_sent(&self, event_id: Uuid) -> Result<()> {
        let stall = *self.mark_stall.read().await;
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if self.failing_marks.read().await.contains(&event_id) {
            return Err(NotificationError::store(format!(
                "write rejected for event {}",
                event_id
            )));
        }

        // Deleted since it was selected: nothing to flag
        if let Some(event) = self.events.write().await.get_mut(&event_id) {
            event.notification_sent = true;
        }
        Ok(())
    }
}

// ============================================================================
// RecordingMailer
// ============================================================================

/// Mailer that records every accepted message instead of delivering it
#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    sent: Arc<RwLock<Vec<OutgoingEmail>>>,
    failing_recipients: Arc<RwLock<HashSet<String>>>,
    delay: Option<Duration>,
}

impl RecordingMailer {
    /// Create a new recording mailer
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay` before accepting each message
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reject every message addressed to `recipient`
    pub async fn fail_for(&self, recipient: impl Into<String>) {
        self.failing_recipients.write().await.insert(recipient.into());
    }

    /// All accepted messages, in submission order
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.read().await.clone()
    }

    /// Number of accepted messages
    pub async fn count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_recipients.read().await.contains(&email.to) {
            return Err(NotificationError::mail(format!(
                "recipient rejected: {}",
                email.to
            )));
        }

        self.sent.write().await.push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_marking_missing_event_is_noop() {
        let store = InMemoryNotificationStore::new();
        let missing = Uuid::now_v7();

        store.mark_notification_sent(missing).await.unwrap();
        assert!(store.get(missing).await.is_none());
    }
}
