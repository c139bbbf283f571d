//! Browser search by launching the browser and typing the query.
//!
//! Best effort: the query goes to whatever window has focus once the settle
//! delay has passed.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{ActionHandlers, blocking};
use crate::error::{NovaError, Result};
use crate::platform::keyboard;

impl ActionHandlers {
    /// Search the web for `query` in the configured browser.
    pub async fn web_search(&self, query: &str) {
        if query.is_empty() {
            warn!("no search query given");
            self.speak("No search query given");
            return;
        }

        let browser = &self.settings.browser_program;
        match self.search_in_browser(query).await {
            Ok(()) => {
                info!("searching for {query} in {browser}");
                self.speak(format!("Searching for {query} in {browser}."));
            }
            Err(e) => {
                error!("could not search in {browser}: {e}");
                self.speak(format!("Could not search in {browser}"));
            }
        }
    }

    async fn search_in_browser(&self, query: &str) -> Result<()> {
        let browser = &self.settings.browser_program;
        let executable = self
            .registry
            .lookup(browser)
            .ok_or_else(|| NovaError::Config(format!("no program mapping for '{browser}'")))?
            .to_owned();
        let keyboard = self
            .deps
            .keyboard
            .clone()
            .ok_or_else(|| NovaError::Unsupported(keyboard::install_instructions().to_owned()))?;

        info!("opening {browser} for search: {query}");
        let processes = Arc::clone(&self.deps.processes);
        blocking(move || processes.launch(&executable)).await?;

        tokio::time::sleep(self.settings.search_settle_delay).await;

        let query = query.to_owned();
        blocking(move || {
            keyboard.type_text(&query)?;
            keyboard.press_enter()
        })
        .await
    }
}
