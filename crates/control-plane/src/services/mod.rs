// Services layer for business logic
// Services own business logic and validation, calling storage directly

pub mod event;
pub mod user;

pub use event::EventService;
pub use user::UserService;

use thiserror::Error;

/// Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Errors that handlers translate into HTTP status codes
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The resource does not exist or belongs to another user
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request was well-formed JSON but failed validation
    #[error("{0}")]
    Validation(String),

    /// The request conflicts with existing data
    #[error("{0}")]
    Conflict(String),

    /// Storage or other unexpected failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ServiceError::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ServiceError::NotFound("Event").to_string(), "Event not found");
        assert_eq!(
            ServiceError::validation("Title is required").to_string(),
            "Title is required"
        );
        let internal: ServiceError = anyhow::anyhow!("connection reset").into();
        assert_eq!(internal.to_string(), "connection reset");
    }
}
