//! POSIX process control: `open -a` on macOS, direct spawn elsewhere.

use std::process::{Command, Stdio};

use tracing::debug;

use super::{ProcessControl, run_checked};
use crate::error::{NovaError, Result};

/// How programs are started on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    /// macOS LaunchServices (`open -a <app>`).
    OpenApp,
    /// Spawn the executable directly and reap it in the background.
    Spawn,
}

/// Process control for macOS and other POSIX hosts. Termination is not supported.
pub struct PosixProcesses {
    launcher: Launcher,
}

impl PosixProcesses {
    pub fn new(launcher: Launcher) -> Self {
        Self { launcher }
    }

    /// The launcher appropriate for the current OS.
    pub fn for_host() -> Self {
        if cfg!(target_os = "macos") {
            Self::new(Launcher::OpenApp)
        } else {
            Self::new(Launcher::Spawn)
        }
    }

    fn open_command(executable: &str) -> Command {
        let mut cmd = Command::new("open");
        cmd.args(["-a", executable]);
        cmd
    }

    /// The launched program is detached from the assistant's terminal.
    fn spawn_command(executable: &str) -> Command {
        let mut cmd = Command::new(executable);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl ProcessControl for PosixProcesses {
    fn name(&self) -> &str {
        "posix"
    }

    fn launch(&self, executable: &str) -> Result<()> {
        match self.launcher {
            Launcher::OpenApp => run_checked(Self::open_command(executable)),
            Launcher::Spawn => {
                let mut child = Self::spawn_command(executable).spawn().map_err(|e| {
                    NovaError::Platform(format!("failed to spawn {executable}: {e}"))
                })?;
                let name = executable.to_owned();
                std::thread::spawn(move || {
                    let status = child.wait();
                    debug!("{name} exited: {status:?}");
                });
                Ok(())
            }
        }
    }

    fn supports_terminate(&self) -> bool {
        false
    }

    fn terminate(&self, executable: &str) -> Result<()> {
        Err(NovaError::Unsupported(format!(
            "closing {executable} is only supported on Windows"
        )))
    }
}
