//! Configuration types for the voice command assistant.
//!
//! The on-disk format is TOML. The four top-level keys (`openai_api_key`,
//! `voice_id`, `program_mapping`, `custom_commands`) form the core key-value
//! document; everything else lives in per-subsystem sections that fall back to
//! defaults when missing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{NovaError, Result};

/// Environment variable consulted when `openai_api_key` is empty.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NovaConfig {
    /// Credential for the interpretation/rewrite service.
    pub openai_api_key: String,
    /// Rendering voice identifier (empty = renderer default).
    pub voice_id: String,
    /// Logical program name to platform executable path/identifier.
    pub program_mapping: BTreeMap<String, String>,
    /// Free-form command text to action text, maintained for external tooling.
    pub custom_commands: BTreeMap<String, String>,
    /// Language-model service settings.
    pub llm: LlmConfig,
    /// Speech input/output settings.
    pub speech: SpeechConfig,
    /// Browser search settings.
    pub search: SearchConfig,
    /// Calendar reminder settings.
    pub reminder: ReminderConfig,
    /// Personal log settings.
    pub personal_log: PersonalLogConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
}

/// OpenAI-compatible chat completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API (without `/v1`).
    pub api_url: String,
    /// Model requested for both interpretation and rewriting.
    pub model: String,
    /// Token cap for the personal log rewrite request.
    pub rewrite_max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_owned(),
            model: "gpt-4".to_owned(),
            rewrite_max_tokens: 150,
            timeout_secs: 30,
        }
    }
}

/// Speech input and output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Maximum utterances waiting to be rendered before new ones are dropped.
    pub queue_capacity: usize,
    /// TTS command line; `None` picks `say` on macOS and `espeak` elsewhere.
    pub tts_command: Option<Vec<String>>,
    /// Recognizer command line whose stdout is one transcript.
    ///
    /// `None` reads utterances as lines from stdin.
    pub input_command: Option<Vec<String>>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            tts_command: None,
            input_command: None,
        }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Registry entry launched for searches.
    pub browser_program: String,
    /// Wait between launching the browser and typing the query.
    pub settle_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            browser_program: "brave browser".to_owned(),
            settle_delay_ms: 5_000,
        }
    }
}

/// Calendar reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// IANA time zone attached to every event.
    pub time_zone: String,
    /// Event length.
    pub duration_minutes: i64,
    /// Target calendar.
    pub calendar_id: String,
    /// Calendar API base URL.
    pub api_url: String,
    /// OAuth bearer token for the calendar API.
    pub access_token: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            time_zone: "America/Los_Angeles".to_owned(),
            duration_minutes: 60,
            calendar_id: "primary".to_owned(),
            api_url: "https://www.googleapis.com/calendar/v3".to_owned(),
            access_token: String::new(),
        }
    }
}

/// Personal log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalLogConfig {
    /// Directory receiving `personal_log_<timestamp>.txt` files.
    pub directory: PathBuf,
}

impl Default for PersonalLogConfig {
    fn default() -> Self {
        Self {
            directory: default_data_dir().join("personal_logs"),
        }
    }
}

/// Log file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the log file.
    pub directory: PathBuf,
    /// Log file name.
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_data_dir().join("logs"),
            file_name: "nova.log".to_owned(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("nova"))
        .unwrap_or_else(|| PathBuf::from("/tmp/nova"))
}

impl NovaConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| NovaError::Config(e.to_string()))
    }

    /// Load the file when it exists, otherwise return defaults.
    pub fn load_or_default(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NovaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/nova/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("nova").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("nova")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/nova-config/config.toml")
        }
    }

    /// The API key from config, or from [`API_KEY_ENV`] when the config value is empty.
    pub fn resolved_api_key(&self) -> Option<String> {
        let key = self.openai_api_key.trim();
        if !key.is_empty() {
            return Some(key.to_owned());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Register or replace a program mapping.
    pub fn set_program(&mut self, name: &str, executable: &str) {
        self.program_mapping
            .insert(name.to_owned(), executable.to_owned());
    }

    /// Remove a program mapping. Returns the removed executable, if any.
    pub fn remove_program(&mut self, name: &str) -> Option<String> {
        self.program_mapping.remove(name)
    }

    /// Register or replace a custom command.
    pub fn set_custom_command(&mut self, command: &str, action: &str) {
        self.custom_commands
            .insert(command.to_owned(), action.to_owned());
    }

    /// Remove a custom command. Returns the removed action, if any.
    pub fn remove_custom_command(&mut self, command: &str) -> Option<String> {
        self.custom_commands.remove(command)
    }
}
