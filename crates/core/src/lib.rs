// Planner Core
//
// This crate provides the DB-agnostic pieces of Professor Planner:
// the domain entities and the upcoming-event reminder sweep.
//
// Key design decisions:
// - Uses traits (NotificationStore, Mailer) for pluggable backends
// - The sweep is a plain async function over those traits so it can be
//   driven by the scheduler in production and called directly in tests
// - The scheduler owns the timer and the skip-if-running guard, nothing else
// - Domain entity types (Event, User) are defined here for API and storage

// Domain entity types
pub mod event;
pub mod user;

pub mod error;
pub mod reminder;
pub mod scheduler;
pub mod sweep;
pub mod traits;

// In-memory implementations for dev mode and testing
pub mod memory;

// Re-exports for convenience
pub use error::{NotificationError, Result};
pub use event::{Event, EventType};
pub use reminder::{NotificationWindow, OutgoingEmail, ReminderEmail};
pub use scheduler::{SchedulerConfig, SweepScheduler, TickOutcome};
pub use sweep::{NotificationSweep, SweepConfig, SweepReport};
pub use traits::{Mailer, NotificationStore, PendingNotification};
pub use user::User;
