// Repository layer for database operations

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;
use super::StorageError;

const EVENT_COLUMNS: &str = "id, user_id, title, description, location, event_type, start_date, end_date, notification_sent, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, department, office)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, department, office, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.department)
        .bind(&input.office)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, department, office, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, department, office, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                department = COALESCE($4, department),
                office = COALESCE($5, office),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, department, office, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.department)
        .bind(&input.office)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Ok(row)
    }

    /// Delete a user together with all of their events
    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM events WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Events (always scoped by owner)
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let sql = format!(
            r#"
            INSERT INTO events (id, user_id, title, description, location, event_type, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(Uuid::now_v7())
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(&input.event_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_event(&self, user_id: Uuid, id: Uuid) -> Result<Option<EventRow>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn list_events(&self, user_id: Uuid) -> Result<Vec<EventRow>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE user_id = $1 ORDER BY start_date ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn update_event(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: UpdateEvent,
    ) -> Result<Option<EventRow>> {
        let sql = format!(
            r#"
            UPDATE events
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                event_type = COALESCE($6, event_type),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(&input.event_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn delete_event(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Reminder sweep
    // ============================================

    pub async fn find_pending_notifications(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<PendingNotificationRow>> {
        let rows = sqlx::query_as::<_, PendingNotificationRow>(
            r#"
            SELECT e.id, e.user_id, e.title, e.description, e.location, e.event_type,
                   e.start_date, e.end_date, e.notification_sent, e.created_at, e.updated_at,
                   u.email AS owner_email
            FROM events e
            JOIN users u ON u.id = e.user_id
            WHERE e.start_date >= $1
              AND e.start_date < $2
              AND e.notification_sent = FALSE
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Set the reminder flag. Only the sweep calls this.
    pub async fn mark_notification_sent(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE events SET notification_sent = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Translate a unique-index violation on users.email into StorageError
fn map_user_write_error(e: sqlx::Error) -> anyhow::Error {
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => StorageError::DuplicateEmail.into(),
        _ => e.into(),
    }
}
