// NotificationStore implementation over the storage backend
//
// Lets the reminder sweep in planner-core read due events and flag them
// without knowing which backend is in use.

use async_trait::async_trait;
use planner_core::{NotificationError, NotificationStore, NotificationWindow, PendingNotification};
use uuid::Uuid;

use super::backend::StorageBackend;

#[async_trait]
impl NotificationStore for StorageBackend {
    async fn find_pending_notifications(
        &self,
        window: &NotificationWindow,
    ) -> planner_core::Result<Vec<PendingNotification>> {
        let rows = StorageBackend::find_pending_notifications(self, window.start, window.end)
            .await
            .map_err(|e| NotificationError::store(format!("{:#}", e)))?;

        Ok(rows.into_iter().map(PendingNotification::from).collect())
    }

    async fn mark_notification_sent(&self, event_id: Uuid) -> planner_core::Result<()> {
        let updated = StorageBackend::mark_notification_sent(self, event_id)
            .await
            .map_err(|e| NotificationError::store(format!("{:#}", e)))?;

        if !updated {
            // Deleted by its owner while the tick was running
            tracing::debug!(event_id = %event_id, "Event gone before it could be flagged");
        }
        Ok(())
    }
}
