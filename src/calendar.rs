//! Calendar reminders.
//!
//! A reminder is a fixed-length event starting at the moment it is requested.
//! [`GoogleCalendar`] submits it to the Google Calendar v3 events API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, SecondsFormat, TimeDelta};
use tracing::info;

use crate::config::ReminderConfig;
use crate::error::{NovaError, Result};

/// Event to create for a "set reminder" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub summary: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// IANA zone name attached to both timestamps.
    pub time_zone: String,
}

impl ReminderRequest {
    pub fn starting_at(
        summary: impl Into<String>,
        start: DateTime<Local>,
        length: TimeDelta,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            start,
            end: start + length,
            time_zone: time_zone.into(),
        }
    }

    /// Event resource body in Google Calendar format.
    ///
    /// Timestamps carry their UTC offset, so the instant is exact whatever
    /// zone the host runs in.
    pub fn to_event_json(&self) -> serde_json::Value {
        serde_json::json!({
            "summary": self.summary,
            "start": {
                "dateTime": self.start.to_rfc3339_opts(SecondsFormat::Secs, false),
                "timeZone": self.time_zone,
            },
            "end": {
                "dateTime": self.end.to_rfc3339_opts(SecondsFormat::Secs, false),
                "timeZone": self.time_zone,
            },
        })
    }
}

/// Request/response contract with the external calendar service.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Create the event and return its identifier.
    async fn create_event(&self, request: &ReminderRequest) -> Result<String>;
}

/// Google Calendar v3 client authenticated with a bearer token.
pub struct GoogleCalendar {
    client: reqwest::Client,
    events_url: String,
    access_token: String,
}

impl GoogleCalendar {
    /// # Errors
    ///
    /// Returns [`NovaError::Calendar`] if the HTTP client cannot be built.
    pub fn new(api_url: &str, calendar_id: &str, access_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NovaError::Calendar(format!("failed to build HTTP client: {e}")))?;
        let events_url = format!(
            "{}/calendars/{}/events",
            api_url.trim_end_matches('/'),
            urlencoding::encode(calendar_id)
        );
        Ok(Self {
            client,
            events_url,
            access_token: access_token.into(),
        })
    }

    pub fn from_config(config: &ReminderConfig) -> Result<Self> {
        Self::new(
            &config.api_url,
            &config.calendar_id,
            config.access_token.clone(),
        )
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn create_event(&self, request: &ReminderRequest) -> Result<String> {
        if self.access_token.trim().is_empty() {
            return Err(NovaError::Calendar(
                "no calendar access token configured".to_owned(),
            ));
        }

        let response = self
            .client
            .post(&self.events_url)
            .bearer_auth(&self.access_token)
            .json(&request.to_event_json())
            .send()
            .await
            .map_err(|e| NovaError::Calendar(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NovaError::Calendar(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NovaError::Calendar(format!("malformed response: {e}")))?;
        let id = created["id"]
            .as_str()
            .ok_or_else(|| NovaError::Calendar("response missing event id".to_owned()))?;

        info!("calendar event created: {id}");
        Ok(id.to_owned())
    }
}
