// Core traits for pluggable backends
//
// These traits allow the reminder sweep to be used with different backends:
// - Database implementations for production
// - In-memory implementations for dev mode and testing
// - SMTP or log-only mail transports

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::event::Event;
use crate::reminder::{NotificationWindow, OutgoingEmail};

// ============================================================================
// NotificationStore - Event Store contract used by the sweep
// ============================================================================

/// An event due for a reminder, with its owner's address joined in
#[derive(Debug, Clone)]
pub struct PendingNotification {
    pub event: Event,
    pub owner_email: String,
}

/// Trait for reading due events and flagging them as notified
///
/// Implementations must return only events whose `start_date` lies in
/// `[window.start, window.end)` and whose `notification_sent` is false.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Load all events due for a reminder in the given window
    async fn find_pending_notifications(
        &self,
        window: &NotificationWindow,
    ) -> Result<Vec<PendingNotification>>;

    /// Set `notification_sent = true` on a single event
    ///
    /// An event deleted after it was selected is not an error: the call
    /// succeeds without writing anything. `Err` is reserved for a store
    /// that could not apply the write.
    async fn mark_notification_sent(&self, event_id: Uuid) -> Result<()>;
}

// ============================================================================
// Mailer - Mail Sender contract used by the sweep
// ============================================================================

/// Trait for submitting a rendered email
///
/// Implementations report success or failure of the submission. Delivery
/// beyond the transport is not tracked.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}
