//! Windows process control via `cmd start` and `taskkill`.

use std::process::Command;

use super::{ProcessControl, run_checked};
use crate::error::Result;

/// Process control for Windows hosts.
pub struct WindowsProcesses;

impl WindowsProcesses {
    fn launch_command(executable: &str) -> Command {
        let mut cmd = Command::new("cmd");
        // The empty string is the window title `start` expects before the target.
        cmd.args(["/C", "start", "", executable]);
        cmd
    }

    fn terminate_command(executable: &str) -> Command {
        let mut cmd = Command::new("taskkill");
        cmd.args(["/f", "/im", image_name(executable)]);
        cmd
    }
}

impl ProcessControl for WindowsProcesses {
    fn name(&self) -> &str {
        "windows"
    }

    fn launch(&self, executable: &str) -> Result<()> {
        run_checked(Self::launch_command(executable))
    }

    fn supports_terminate(&self) -> bool {
        true
    }

    fn terminate(&self, executable: &str) -> Result<()> {
        run_checked(Self::terminate_command(executable))
    }
}

/// `taskkill /im` matches on the image name, not the full path.
fn image_name(executable: &str) -> &str {
    executable
        .rsplit(|c: char| c == '\\' || c == '/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(executable)
}
