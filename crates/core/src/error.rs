// Error types for the reminder sweep

use std::time::Duration;
use thiserror::Error;

/// Result type alias for notification operations
pub type Result<T> = std::result::Result<T, NotificationError>;

/// Errors that can occur while sweeping for and delivering reminders
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Event store query or update failed
    #[error("Event store error: {0}")]
    Store(String),

    /// Mail transport rejected the message
    #[error("Mail delivery error: {0}")]
    Mail(String),

    /// Recipient or sender address could not be parsed
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Mail submission did not finish within the send timeout
    #[error("Mail delivery timed out after {0:?}")]
    Timeout(Duration),

    /// Mail or sweep settings are missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NotificationError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        NotificationError::Store(msg.into())
    }

    /// Create a mail delivery error
    pub fn mail(msg: impl Into<String>) -> Self {
        NotificationError::Mail(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        NotificationError::InvalidAddress(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        NotificationError::Configuration(msg.into())
    }

    /// Whether this error only concerns a single delivery attempt.
    /// Store errors abort the whole tick, everything else is per-event.
    pub fn is_per_event(&self) -> bool {
        !matches!(
            self,
            NotificationError::Store(_) | NotificationError::Configuration(_)
        )
    }
}
