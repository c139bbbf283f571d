//! Dictated personal logs.
//!
//! Prompt, capture a second utterance, have the language model rewrite it,
//! save it to a timestamped file and remember it as the user's `last_log`.
//! A failure at any step abandons the entry.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info};

use super::ActionHandlers;
use crate::context::{Context, UserId};
use crate::error::{InputError, NovaError, Result};
use crate::llm::ChatRequest;

/// System instruction for the rewrite request.
pub const REWRITE_INSTRUCTION: &str =
    "Rewrite the following as a personal log entry similar to Star Trek logs:";

const DICTATION_PROMPT: &str = "Please dictate your personal log.";

impl ActionHandlers {
    /// Record a personal log entry for `user`.
    pub async fn start_personal_log(&self, user: &UserId) {
        match self.record_personal_log(user).await {
            Ok(path) => {
                info!("personal log entry created: {}", path.display());
                self.speak("Personal log entry created.");
            }
            Err(e) => {
                error!("could not start personal log: {e}");
                self.speak("Could not start personal log");
            }
        }
    }

    async fn record_personal_log(&self, user: &UserId) -> Result<PathBuf> {
        // Wait for the prompt to finish so it is not captured as dictation.
        self.deps.speech.speak_and_wait(DICTATION_PROMPT).await?;

        let dictated = self.deps.input.listen().await?;
        if dictated.trim().is_empty() {
            return Err(InputError::NoSpeech.into());
        }

        let request = ChatRequest::new(REWRITE_INSTRUCTION, dictated)
            .with_max_tokens(self.settings.rewrite_max_tokens);
        let rewritten = self.deps.llm.complete(&request).await?.trim().to_owned();
        if rewritten.is_empty() {
            return Err(NovaError::Llm("empty personal log rewrite".to_owned()));
        }
        info!("rewritten personal log: {rewritten}");

        let path = save_log(&self.settings.personal_log_dir, &rewritten, Local::now())?;

        let mut context = Context::new();
        context.insert("last_log".to_owned(), serde_json::Value::String(rewritten));
        self.deps.context.update(user, context);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("personal log saved as {file_name}");
        self.speak(format!("Personal log saved as {file_name}"));
        Ok(path)
    }
}

/// Write `entry` to `personal_log_<YYYYMMDD_HHMMSS>.txt` inside `dir`.
fn save_log(dir: &Path, entry: &str, at: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("personal_log_{}.txt", at.format("%Y%m%d_%H%M%S")));
    std::fs::write(&path, entry)?;
    Ok(path)
}
