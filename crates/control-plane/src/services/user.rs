// User service: registration and the caller's own profile

use crate::api::users::{CreateUserRequest, UpdateProfileRequest};
use crate::storage::{
    models::{CreateUserRow, UpdateUser},
    StorageBackend, StorageError,
};
use lettre::Address;
use planner_core::User;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};

const EMAIL_IN_USE: &str = "Email already in use";

pub struct UserService {
    db: StorageBackend,
}

impl UserService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn register(&self, req: CreateUserRequest) -> ServiceResult<User> {
        let name = validate_name(&req.name)?;
        let email = normalize_email(&req.email)?;

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict(EMAIL_IN_USE));
        }

        let input = CreateUserRow {
            name,
            email,
            department: req.department,
            office: req.office,
        };
        let row = self.db.create_user(input).await.map_err(map_write_error)?;
        tracing::info!(user_id = %row.id, "User registered");

        Ok(row.into())
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        self.db
            .get_user(id)
            .await?
            .map(User::from)
            .ok_or(ServiceError::NotFound("User"))
    }

    pub async fn update(&self, id: Uuid, req: UpdateProfileRequest) -> ServiceResult<User> {
        let name = req.name.as_deref().map(validate_name).transpose()?;
        let email = req.email.as_deref().map(normalize_email).transpose()?;

        if let Some(email) = &email {
            if let Some(other) = self.db.get_user_by_email(email).await? {
                if other.id != id {
                    return Err(ServiceError::conflict(EMAIL_IN_USE));
                }
            }
        }

        let input = UpdateUser {
            name,
            email,
            department: req.department,
            office: req.office,
        };

        self.db
            .update_user(id, input)
            .await
            .map_err(map_write_error)?
            .map(User::from)
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Delete the user and every event they own
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if self.db.delete_user(id).await? {
            tracing::info!(user_id = %id, "User deleted with their events");
            Ok(())
        } else {
            Err(ServiceError::NotFound("User"))
        }
    }
}

fn validate_name(name: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Name is required"));
    }
    Ok(name.to_string())
}

/// Trim, lowercase and check that reminders can be addressed to it
fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    email
        .parse::<Address>()
        .map_err(|_| ServiceError::validation("A valid email address is required"))?;
    Ok(email)
}

fn map_write_error(e: anyhow::Error) -> ServiceError {
    match e.downcast_ref::<StorageError>() {
        Some(StorageError::DuplicateEmail) => ServiceError::conflict(EMAIL_IN_USE),
        None => ServiceError::Internal(e),
    }
}
