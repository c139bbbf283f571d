//! Open and close registered programs.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{ActionHandlers, blocking};

impl ActionHandlers {
    /// Launch the program registered under `name`.
    pub async fn open_program(&self, name: &str) {
        if name.is_empty() {
            warn!("no program specified");
            self.speak("No program specified");
            return;
        }
        let Some(executable) = self.registry.lookup(name) else {
            warn!("program '{name}' not recognized");
            self.speak(format!("Program '{name}' not recognized."));
            return;
        };

        let processes = Arc::clone(&self.deps.processes);
        let executable = executable.to_owned();
        match blocking(move || processes.launch(&executable)).await {
            Ok(()) => {
                info!("opening {name}");
                self.speak(format!("Opening {name}"));
            }
            Err(e) => {
                error!("could not open {name}: {e}");
                self.speak(format!("Could not open {name}"));
            }
        }
    }

    /// Terminate the program registered under `name`, where the host allows it.
    pub async fn close_program(&self, name: &str) {
        let Some(executable) = self.registry.lookup(name) else {
            warn!("program '{name}' not recognized for closing");
            self.speak(format!("Program '{name}' not recognized for closing."));
            return;
        };

        if !self.deps.processes.supports_terminate() {
            warn!("closing {name} is only supported on Windows");
            self.speak(format!("Closing {name} is only supported on Windows"));
            return;
        }

        let processes = Arc::clone(&self.deps.processes);
        let executable = executable.to_owned();
        match blocking(move || processes.terminate(&executable)).await {
            Ok(()) => {
                info!("closing {name}");
                self.speak(format!("Closing {name}"));
            }
            Err(e) => {
                error!("could not close {name}: {e}");
                self.speak(format!("Could not close {name}"));
            }
        }
    }
}
