// Periodic driver for the reminder sweep
//
// Ticks are fired on a fixed interval. The first tick fires one full
// interval after start. A tick that comes due while the previous one is
// still running is skipped, so at most one sweep runs at a time.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::sweep::{NotificationSweep, SweepReport};

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

impl SchedulerConfig {
    /// Longest accepted tick interval
    pub const MAX_INTERVAL: Duration = Duration::from_secs(7 * 24 * 3600);

    /// Set the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// What happened when a tick came due
#[derive(Debug)]
pub enum TickOutcome {
    /// The sweep ran to the end
    Completed(SweepReport),
    /// The sweep aborted, nothing after the failure point was attempted
    Failed(String),
    /// A previous tick was still running
    Skipped,
}

/// Runs a [`NotificationSweep`] on a timer until shut down
pub struct SweepScheduler {
    sweep: Arc<NotificationSweep>,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SweepScheduler {
    pub fn new(sweep: Arc<NotificationSweep>, config: SchedulerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            sweep,
            config,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Whether a tick is currently in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one tick now, subject to the same skip-if-running guard as the timer
    pub async fn trigger(&self) -> TickOutcome {
        run_guarded(&self.sweep, &self.running).await
    }

    /// Start the timer loop in the background
    pub fn start(&self) -> JoinHandle<()> {
        let sweep = Arc::clone(&self.sweep);
        let running = Arc::clone(&self.running);
        let interval = self.config.interval;
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!(interval_secs = interval.as_secs(), "Starting reminder sweep scheduler");

        tokio::spawn(async move {
            let Some(first_tick) = Instant::now().checked_add(interval) else {
                error!(
                    interval_secs = interval.as_secs(),
                    "Sweep interval out of range, scheduler not started"
                );
                return;
            };
            let mut ticker = tokio::time::interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let sweep = Arc::clone(&sweep);
                        let running = Arc::clone(&running);
                        // Spawned so a slow tick never delays the timer or shutdown
                        tokio::spawn(async move {
                            run_guarded(&sweep, &running).await;
                        });
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Sweep scheduler: shutdown requested");
                        break;
                    }
                }
            }

            info!("Reminder sweep scheduler stopped");
        })
    }

    /// Stop firing new ticks. An in-flight tick is left to finish on its own.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Clears the running flag when the tick ends, including on panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn run_guarded(sweep: &NotificationSweep, running: &Arc<AtomicBool>) -> TickOutcome {
    if running
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        warn!("Previous reminder sweep still running, skipping tick");
        return TickOutcome::Skipped;
    }
    let _guard = RunningGuard(Arc::clone(running));

    match sweep.run_tick(Utc::now()).await {
        Ok(report) => {
            info!(
                selected = report.selected,
                sent = report.sent.len(),
                failed = report.failed.len(),
                unflagged = report.unflagged.len(),
                "Reminder sweep finished"
            );
            TickOutcome::Completed(report)
        }
        Err(e) => {
            error!(error = %e, "Reminder sweep aborted");
            TickOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventType};
    use crate::memory::{InMemoryNotificationStore, RecordingMailer};
    use crate::sweep::SweepConfig;
    use chrono::Duration as ChronoDuration;
    use uuid::Uuid;

    async fn setup(
        mailer: RecordingMailer,
        sweep_config: SweepConfig,
        config: SchedulerConfig,
    ) -> (SweepScheduler, InMemoryNotificationStore) {
        let store = InMemoryNotificationStore::new();
        let owner = Uuid::now_v7();
        store.add_owner(owner, "prof@example.edu").await;

        let start = Utc::now() + ChronoDuration::hours(60);
        store
            .seed(Event {
                id: Uuid::now_v7(),
                user_id: owner,
                title: "Office hours".to_string(),
                description: None,
                location: Some("Room 204".to_string()),
                event_type: EventType::OfficeHours,
                start_date: start,
                end_date: None,
                notification_sent: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;

        let sweep = NotificationSweep::new(
            Arc::new(store.clone()),
            Arc::new(mailer),
            sweep_config,
        );
        (SweepScheduler::new(Arc::new(sweep), config), store)
    }

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(3600));

        let config = config.with_interval(Duration::from_secs(60));
        assert_eq!(config.interval, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_fires_after_one_interval() {
        let mailer = RecordingMailer::new();
        let (scheduler, _store) =
            setup(mailer.clone(), SweepConfig::default(), SchedulerConfig::default()).await;

        let handle = scheduler.start();

        tokio::time::sleep(Duration::from_secs(59 * 60)).await;
        assert_eq!(mailer.count().await, 0);

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(mailer.count().await, 1);

        scheduler.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_skips_while_tick_in_progress() {
        let mailer = RecordingMailer::new().with_delay(Duration::from_secs(10));
        let (scheduler, _store) =
            setup(mailer.clone(), SweepConfig::default(), SchedulerConfig::default()).await;
        let scheduler = Arc::new(scheduler);

        let first = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.trigger().await })
        };
        tokio::task::yield_now().await;

        assert!(scheduler.is_running());
        assert!(matches!(scheduler.trigger().await, TickOutcome::Skipped));

        let outcome = first.await.unwrap();
        match outcome {
            TickOutcome::Completed(report) => assert_eq!(report.sent.len(), 1),
            other => panic!("expected completed tick, got {:?}", other),
        }
        assert!(!scheduler.is_running());
        assert_eq!(mailer.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_timer_ticks_do_not_double_send() {
        // Each send outlasts two intervals
        let mailer = RecordingMailer::new().with_delay(Duration::from_secs(150));
        let (scheduler, _store) = setup(
            mailer.clone(),
            SweepConfig::default().with_send_timeout(Duration::from_secs(600)),
            SchedulerConfig::default().with_interval(Duration::from_secs(60)),
        )
        .await;

        let handle = scheduler.start();
        tokio::time::sleep(Duration::from_secs(5 * 60 + 1)).await;

        assert_eq!(mailer.count().await, 1);

        scheduler.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_tick_releases_guard() {
        let (scheduler, store) = setup(
            RecordingMailer::new(),
            SweepConfig::default(),
            SchedulerConfig::default(),
        )
        .await;
        store.set_query_failure(Some("pool timed out")).await;

        match scheduler.trigger().await {
            TickOutcome::Failed(message) => assert!(message.contains("pool timed out")),
            other => panic!("expected failed tick, got {:?}", other),
        }
        assert!(!scheduler.is_running());

        store.set_query_failure(None).await;
        assert!(matches!(
            scheduler.trigger().await,
            TickOutcome::Completed(_)
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_interval_does_not_panic() {
        let (scheduler, _store) = setup(
            RecordingMailer::new(),
            SweepConfig::default(),
            SchedulerConfig::default().with_interval(Duration::from_secs(u64::MAX)),
        )
        .await;

        let handle = scheduler.start();
        scheduler.shutdown();
        assert!(handle.await.is_ok());

        // The guard is untouched, so a manual tick still works
        assert!(matches!(
            scheduler.trigger().await,
            TickOutcome::Completed(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timer() {
        let mailer = RecordingMailer::new();
        let (scheduler, _store) =
            setup(mailer.clone(), SweepConfig::default(), SchedulerConfig::default()).await;

        let handle = scheduler.start();
        scheduler.shutdown();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(3 * 3600)).await;
        assert_eq!(mailer.count().await, 0);
    }
}
