// Configuration loading from environment variables
//
// `.env` is loaded by main through dotenvy before any of these run.
// ServerConfig never fails; NotificationConfig fails fast when reminders are
// enabled but the mail relay cannot be used.

use planner_core::{NotificationError, Result, SchedulerConfig};
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_INTERVAL_SECS: u64 = 3600;
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;
const MAX_SEND_TIMEOUT_SECS: u64 = 3600;

// ============================================================================
// HTTP server
// ============================================================================

/// HTTP server and storage settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Postgres URL; `None` runs with in-memory storage
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url: get("DATABASE_URL").filter(|s| !s.is_empty()),
            bind_addr: get("BIND_ADDR")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_prefix: get("API_PREFIX").unwrap_or_default(),
            cors_allowed_origins,
        }
    }
}

// ============================================================================
// Reminder sweep and mail
// ============================================================================

/// How reminder emails leave the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    /// Authenticated SMTP relay
    Smtp,
    /// Write rendered messages to the log only
    Log,
}

/// Mail relay settings. `username` doubles as the From address.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub smtp_host: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("transport", &self.transport)
            .field("smtp_host", &self.smtp_host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reminder sweep settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub send_timeout: Duration,
    pub mail: MailConfig,
}

impl NotificationConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let enabled = match get("NOTIFICATIONS_ENABLED") {
            Some(value) => parse_bool("NOTIFICATIONS_ENABLED", &value)?,
            None => true,
        };
        let interval = parse_secs(
            &get,
            "NOTIFICATION_INTERVAL_SECS",
            DEFAULT_INTERVAL_SECS,
            SchedulerConfig::MAX_INTERVAL.as_secs(),
        )?;
        let send_timeout = parse_secs(
            &get,
            "NOTIFICATION_SEND_TIMEOUT_SECS",
            DEFAULT_SEND_TIMEOUT_SECS,
            MAX_SEND_TIMEOUT_SECS,
        )?;

        let transport = match get("MAIL_TRANSPORT")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("") | Some("smtp") => MailTransport::Smtp,
            Some("log") => MailTransport::Log,
            Some(other) => {
                return Err(NotificationError::config(format!(
                    "MAIL_TRANSPORT must be 'smtp' or 'log', got '{}'",
                    other
                )))
            }
        };

        let mail = MailConfig {
            transport,
            smtp_host: get("SMTP_HOST")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            username: get("EMAIL_USER").unwrap_or_default().trim().to_string(),
            password: get("EMAIL_PASS").unwrap_or_default(),
        };

        if enabled && transport == MailTransport::Smtp {
            if mail.username.is_empty() {
                return Err(NotificationError::config(
                    "EMAIL_USER is required to send reminder emails \
                     (set NOTIFICATIONS_ENABLED=false or MAIL_TRANSPORT=log to run without it)",
                ));
            }
            if mail.password.is_empty() {
                return Err(NotificationError::config(
                    "EMAIL_PASS is required to send reminder emails \
                     (set NOTIFICATIONS_ENABLED=false or MAIL_TRANSPORT=log to run without it)",
                ));
            }
        }

        Ok(Self {
            enabled,
            interval,
            send_timeout,
            mail,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(NotificationError::config(format!(
            "{} must be true or false, got '{}'",
            key, other
        ))),
    }
}

/// Seconds in `1..=max`, or `default` when unset
fn parse_secs(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
    max: u64,
) -> Result<Duration> {
    let Some(raw) = get(key).filter(|s| !s.trim().is_empty()) else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if (1..=max).contains(&secs) => Ok(Duration::from_secs(secs)),
        _ => Err(NotificationError::config(format!(
            "{} must be between 1 and {} seconds, got '{}'",
            key, max, raw
        ))),
    }
}
