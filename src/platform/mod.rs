//! Host capabilities: process control and keystroke injection.
//!
//! The capability variant is chosen once at startup by host detection
//! ([`create_process_control`], [`keyboard::detect_keyboard`]); handlers only
//! see the trait objects.

pub mod keyboard;
mod posix;
mod windows;

pub use keyboard::Keyboard;
pub use posix::{Launcher, PosixProcesses};
pub use windows::WindowsProcesses;

use std::process::Command;
use std::sync::Arc;

use crate::error::{NovaError, Result};

/// Launch and terminate programs by their registered executable.
pub trait ProcessControl: Send + Sync {
    /// Human-readable variant name (e.g. "windows").
    fn name(&self) -> &str;

    /// Start `executable`. Returns once the launch has been handed to the OS.
    fn launch(&self, executable: &str) -> Result<()>;

    /// Whether [`terminate`](ProcessControl::terminate) is available on this host.
    fn supports_terminate(&self) -> bool;

    /// Forcefully stop every process running `executable`.
    ///
    /// # Errors
    ///
    /// Returns [`NovaError::Unsupported`] where termination is not available.
    fn terminate(&self, executable: &str) -> Result<()>;
}

/// Create the process-control variant for the current host.
pub fn create_process_control() -> Arc<dyn ProcessControl> {
    if cfg!(windows) {
        Arc::new(WindowsProcesses)
    } else {
        Arc::new(PosixProcesses::for_host())
    }
}

/// Run `cmd` to completion and fail on a non-zero exit.
pub(crate) fn run_checked(mut cmd: Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let output = cmd
        .output()
        .map_err(|e| NovaError::Platform(format!("failed to spawn {program}: {e}")))?;
    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(NovaError::Platform(format!(
            "{program} exited with code {code}: {}",
            detail.trim()
        )));
    }
    Ok(())
}
