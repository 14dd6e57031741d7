// Reminder window and email rendering
//
// The window is always a 24-hour slice starting exactly two days after the
// moment a tick runs. It is not aligned to calendar days.

use chrono::{DateTime, Duration, Utc};
use minijinja::{context, Environment, Value};
use serde::{Deserialize, Serialize};

use crate::error::{NotificationError, Result};
use crate::event::Event;

/// Half-open time range `[start, end)` of event start dates due for a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NotificationWindow {
    /// How far ahead of an event the reminder goes out
    pub const LEAD_DAYS: i64 = 2;
    /// Width of the slice scanned on every tick
    pub const SPAN_HOURS: i64 = 24;

    /// Window scanned by a tick running at `now`
    pub fn starting_from(now: DateTime<Utc>) -> Self {
        let start = now + Duration::days(Self::LEAD_DAYS);
        Self {
            start,
            end: start + Duration::hours(Self::SPAN_HOURS),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// A rendered message ready for a mail transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Reminder body. The `.html` suffix turns on auto-escaping.
const REMINDER_TEMPLATE_NAME: &str = "reminder.html";

const REMINDER_TEMPLATE: &str = "<h2>Upcoming Event Reminder</h2>
<p>You have an upcoming event in {{ lead_days }} days:</p>
<h3>{{ title }}</h3>
<p><strong>Description:</strong> {{ description }}</p>
<p><strong>Date:</strong> {{ date }}</p>
<p><strong>Time:</strong> {{ time }}</p>
<p><strong>Location:</strong> {{ location }}</p>
";

/// Fixed "upcoming event" template
pub struct ReminderEmail;

impl ReminderEmail {
    /// Render the reminder for `event`, addressed to `to`
    pub fn render(event: &Event, to: &str) -> Result<OutgoingEmail> {
        let mut env = Environment::new();
        env.add_template(REMINDER_TEMPLATE_NAME, REMINDER_TEMPLATE)
            .map_err(render_error)?;
        let template = env
            .get_template(REMINDER_TEMPLATE_NAME)
            .map_err(render_error)?;

        let html_body = template
            .render(context! {
                lead_days => NotificationWindow::LEAD_DAYS,
                title => event.title,
                description => event.description.as_deref().unwrap_or_default(),
                // Formatted here, so the slashes need no escaping
                date => Value::from_safe_string(format_date(event.start_date)),
                time => Value::from_safe_string(format_time(event.start_date)),
                location => event.display_location(),
            })
            .map_err(render_error)?;

        Ok(OutgoingEmail {
            to: to.to_string(),
            subject: format!("Upcoming Event: {}", event.title),
            html_body,
        })
    }
}

fn render_error(e: minijinja::Error) -> NotificationError {
    NotificationError::mail(format!("Failed to render reminder: {}", e))
}

/// `M/D/YYYY`
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%-m/%-d/%Y").to_string()
}

/// `H:MM:SS AM UTC`
pub fn format_time(instant: DateTime<Utc>) -> String {
    instant.format("%-I:%M:%S %p UTC").to_string()
}
