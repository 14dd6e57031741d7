// Mail transports for reminder emails
// Decision: The transport is built once at startup and shared with the sweep
// Decision: Log-only delivery exists for development and must be selected
// explicitly with MAIL_TRANSPORT=log
//
// SMTP delivery uses lettre's async transport on the tokio runtime.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use planner_core::{Mailer, NotificationError, OutgoingEmail, Result};

use crate::config::{MailConfig, MailTransport};

/// Mailer selected by configuration
pub enum MailerBackend {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl MailerBackend {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        match config.transport {
            MailTransport::Smtp => Ok(Self::Smtp(SmtpMailer::new(config)?)),
            MailTransport::Log => Ok(Self::Log(LogMailer)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::Log(_) => "log",
        }
    }
}

#[async_trait]
impl Mailer for MailerBackend {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        match self {
            Self::Smtp(mailer) => mailer.send(email).await,
            Self::Log(mailer) => mailer.send(email).await,
        }
    }
}

// ============================================================================
// SMTP
// ============================================================================

/// Authenticated SMTP relay (STARTTLS/TLS via `relay`)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config.username.parse().map_err(|e| {
            NotificationError::config(format!(
                "EMAIL_USER is not a valid sender address '{}': {}",
                config.username, e
            ))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| {
                NotificationError::config(format!(
                    "Invalid SMTP relay '{}': {}",
                    config.smtp_host, e
                ))
            })?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::invalid_address(format!("{}: {}", email.to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)
            .map_err(|e| NotificationError::mail(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::mail(e.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// Log only
// ============================================================================

/// Logs each message instead of sending it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Reminder email (log transport, not delivered)"
        );
        tracing::debug!(body = %email.html_body, "Reminder email body");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config(username: &str) -> MailConfig {
        MailConfig {
            transport: MailTransport::Smtp,
            smtp_host: "smtp.example.edu".to_string(),
            username: username.to_string(),
            password: "secret".to_string(),
        }
    }

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            subject: "Upcoming Event: Lab".to_string(),
            html_body: "<h2>Upcoming Event Reminder</h2>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_sender_is_configuration_error() {
        let err = SmtpMailer::new(&smtp_config("not a sender")).err().unwrap();
        assert!(matches!(err, NotificationError::Configuration(_)));
        assert!(err.to_string().contains("EMAIL_USER"));
    }

    #[tokio::test]
    async fn test_build_message_sets_html_and_subject() {
        let mailer = SmtpMailer::new(&smtp_config("planner@example.edu")).unwrap();
        let message = mailer.build_message(email("prof@example.edu")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Upcoming Event: Lab"));
        assert!(raw.contains("To: prof@example.edu"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_bad_recipient_is_per_event_failure() {
        let mailer = SmtpMailer::new(&smtp_config("planner@example.edu")).unwrap();
        let err = mailer.build_message(email("nobody")).unwrap_err();
        assert!(matches!(err, NotificationError::InvalidAddress(_)));
        assert!(err.is_per_event());
    }

    #[tokio::test]
    async fn test_log_backend_accepts_everything() {
        let config = MailConfig {
            transport: MailTransport::Log,
            smtp_host: String::new(),
            username: String::new(),
            password: String::new(),
        };
        let mailer = MailerBackend::from_config(&config).unwrap();
        assert_eq!(mailer.kind(), "log");
        mailer.send(email("prof@example.edu")).await.unwrap();
    }
}
