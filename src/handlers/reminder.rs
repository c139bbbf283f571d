//! Calendar reminders.

use chrono::Local;
use tracing::{error, info};

use super::ActionHandlers;
use crate::calendar::ReminderRequest;

impl ActionHandlers {
    /// Create a calendar event starting now with `details` as its summary.
    pub async fn set_reminder(&self, details: &str) {
        let request = ReminderRequest::starting_at(
            details,
            Local::now(),
            self.settings.reminder_length,
            self.settings.reminder_time_zone.clone(),
        );
        match self.deps.calendar.create_event(&request).await {
            Ok(id) => {
                info!("reminder set: {details} (event {id})");
                self.speak("Reminder has been set.");
            }
            Err(e) => {
                error!("error setting reminder: {e}");
                self.speak("Could not set the reminder.");
            }
        }
    }
}
