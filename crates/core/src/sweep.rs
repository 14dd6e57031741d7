// Upcoming-event reminder sweep
//
// One tick:
// 1. Compute the window [now + 2d, now + 2d + 24h)
// 2. Load unflagged events starting inside it (a store failure aborts the tick)
// 3. For each event, render and send the reminder with a bounded timeout
// 4. Flag the event as notified once the send succeeded
//
// A failed or timed-out send only affects its own event: it stays unflagged
// and the loop moves on. Processing order is whatever the store returns.
// Store calls are bounded too, so a hung database cannot hold the
// scheduler's running guard forever.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{NotificationError, Result};
use crate::reminder::{NotificationWindow, OutgoingEmail, ReminderEmail};
use crate::traits::{Mailer, NotificationStore, PendingNotification};

/// Sweep configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Upper bound for a single mail submission
    pub send_timeout: Duration,
    /// Upper bound for the due-event query and for each flag write
    pub store_timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(30),
        }
    }
}

impl SweepConfig {
    /// Set the per-send timeout
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the timeout for store calls
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub window: NotificationWindow,
    /// Number of events that matched the selection predicate
    pub selected: usize,
    /// Sent and flagged
    pub sent: Vec<Uuid>,
    /// Send failed or timed out, flag left false
    pub failed: Vec<Uuid>,
    /// Sent, but the flag write failed; will be selected again
    pub unflagged: Vec<Uuid>,
}

impl SweepReport {
    fn new(window: NotificationWindow, selected: usize) -> Self {
        Self {
            window,
            selected,
            sent: Vec::new(),
            failed: Vec::new(),
            unflagged: Vec::new(),
        }
    }

    /// Number of emails accepted by the transport during the tick
    pub fn delivered(&self) -> usize {
        self.sent.len() + self.unflagged.len()
    }
}

/// Finds events due in the reminder window and emails their owners once
pub struct NotificationSweep {
    store: Arc<dyn NotificationStore>,
    mailer: Arc<dyn Mailer>,
    config: SweepConfig,
}

impl NotificationSweep {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        mailer: Arc<dyn Mailer>,
        config: SweepConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    /// Run a single tick as of `now`
    #[instrument(skip(self), fields(window_start = tracing::field::Empty))]
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let window = NotificationWindow::starting_from(now);
        tracing::Span::current().record("window_start", window.start.to_rfc3339().as_str());

        let pending = self
            .bounded_store_call("query", self.store.find_pending_notifications(&window))
            .await?;
        debug!(count = pending.len(), "Loaded events due for a reminder");

        let mut report = SweepReport::new(window, pending.len());

        for PendingNotification { event, owner_email } in pending {
            let delivery = match ReminderEmail::render(&event, &owner_email) {
                Ok(email) => self.deliver(email).await,
                Err(e) => Err(e),
            };

            match delivery {
                Ok(()) => {}
                Err(e) if !e.is_per_event() => {
                    error!(event_id = %event.id, error = %e, "Mail transport unusable, aborting tick");
                    return Err(e);
                }
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Failed to send reminder");
                    report.failed.push(event.id);
                    continue;
                }
            }

            match self
                .bounded_store_call("flag write", self.store.mark_notification_sent(event.id))
                .await
            {
                Ok(()) => {
                    info!(event_id = %event.id, user_id = %event.user_id, "Reminder sent");
                    report.sent.push(event.id);
                }
                Err(e) => {
                    error!(
                        event_id = %event.id,
                        error = %e,
                        "Reminder sent but flag write failed, event will be selected again"
                    );
                    report.unflagged.push(event.id);
                }
            }
        }

        Ok(report)
    }

    async fn deliver(&self, email: OutgoingEmail) -> Result<()> {
        let limit = self.config.send_timeout;
        tokio::time::timeout(limit, self.mailer.send(email))
            .await
            .map_err(|_| NotificationError::Timeout(limit))?
    }

    async fn bounded_store_call<T>(
        &self,
        what: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        let limit = self.config.store_timeout;
        tokio::time::timeout(limit, call).await.map_err(|_| {
            NotificationError::store(format!("{} timed out after {:?}", what, limit))
        })?
    }
}
