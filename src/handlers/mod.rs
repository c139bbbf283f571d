//! Action handlers.
//!
//! One method per action kind. Every handler performs its side effect, logs
//! the outcome and speaks feedback on success and on failure. Failures are
//! handled here and never reach the dispatcher.

mod personal_log;
mod programs;
mod reminder;
mod search;

pub use personal_log::REWRITE_INSTRUCTION;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeDelta};
use tracing::info;

use crate::calendar::CalendarService;
use crate::config::NovaConfig;
use crate::context::ContextStore;
use crate::error::{NovaError, Result};
use crate::llm::LanguageModel;
use crate::platform::{Keyboard, ProcessControl};
use crate::registry::ProgramRegistry;
use crate::stt::SpeechInput;
use crate::tts::SpeechOutputChannel;

/// Phrase spoken for actions that match no rule.
pub const UNRECOGNIZED_PHRASE: &str = "Command not recognized. Please try again.";

/// External collaborators the handlers act through.
#[derive(Clone)]
pub struct Collaborators {
    pub speech: SpeechOutputChannel,
    pub input: Arc<dyn SpeechInput>,
    pub llm: Arc<dyn LanguageModel>,
    pub calendar: Arc<dyn CalendarService>,
    pub processes: Arc<dyn ProcessControl>,
    /// `None` when no keystroke backend is installed.
    pub keyboard: Option<Arc<dyn Keyboard>>,
    pub context: Arc<ContextStore>,
}

/// Tunables taken from configuration.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Registry entry used for web searches.
    pub browser_program: String,
    /// Wait between launching the browser and typing.
    pub search_settle_delay: Duration,
    pub personal_log_dir: PathBuf,
    pub rewrite_max_tokens: u32,
    pub reminder_time_zone: String,
    pub reminder_length: TimeDelta,
}

impl HandlerSettings {
    pub fn from_config(config: &NovaConfig) -> Self {
        Self {
            browser_program: config.search.browser_program.clone(),
            search_settle_delay: Duration::from_millis(config.search.settle_delay_ms),
            personal_log_dir: config.personal_log.directory.clone(),
            rewrite_max_tokens: config.llm.rewrite_max_tokens,
            reminder_time_zone: config.reminder.time_zone.clone(),
            reminder_length: TimeDelta::try_minutes(config.reminder.duration_minutes)
                .unwrap_or(TimeDelta::hours(1)),
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self::from_config(&NovaConfig::default())
    }
}

/// The set of handlers the dispatcher routes to.
pub struct ActionHandlers {
    deps: Collaborators,
    registry: ProgramRegistry,
    settings: HandlerSettings,
}

impl ActionHandlers {
    pub fn new(deps: Collaborators, registry: ProgramRegistry, settings: HandlerSettings) -> Self {
        Self {
            deps,
            registry,
            settings,
        }
    }

    fn speak(&self, text: impl Into<String>) {
        self.deps.speech.speak(text);
    }

    /// Speak the current local time as `HH:MM:SS`.
    pub fn report_time(&self) {
        let now = Local::now().format("%H:%M:%S").to_string();
        info!("current time is {now}");
        self.speak(format!("The current time is {now}"));
    }

    /// Speak the fallback phrase.
    pub fn unrecognized(&self) {
        info!("command not recognized");
        self.speak(UNRECOGNIZED_PHRASE);
    }
}

/// Run blocking capability work off the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| NovaError::Platform(format!("blocking task failed: {e}")))?
}
