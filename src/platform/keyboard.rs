//! Synthetic keystrokes into whichever window has focus.
//!
//! - **Linux/X11**: `xdotool`
//! - **macOS**: `osascript` driving System Events
//! - **Windows**: PowerShell `SendKeys`
//!
//! There is no check that the intended window actually has focus.

use std::process::Command;
use std::sync::Arc;

use super::run_checked;
use crate::error::Result;

/// Keystroke injection backend.
pub trait Keyboard: Send + Sync {
    /// Backend name (e.g. "xdotool").
    fn name(&self) -> &str;

    /// Returns `true` if the backend tool is installed.
    fn is_available(&self) -> bool;

    /// Type `text` as individual keystrokes.
    fn type_text(&self, text: &str) -> Result<()>;

    /// Press the Enter/Return key.
    fn press_enter(&self) -> Result<()>;
}

/// Detect the keystroke backend for the current OS.
///
/// Returns `None` if no suitable tool is installed.
pub fn detect_keyboard() -> Option<Arc<dyn Keyboard>> {
    let candidate: Arc<dyn Keyboard> = if cfg!(target_os = "macos") {
        Arc::new(AppleScriptKeyboard)
    } else if cfg!(windows) {
        Arc::new(SendKeysKeyboard)
    } else {
        Arc::new(XdotoolKeyboard)
    };
    candidate.is_available().then_some(candidate)
}

/// Message explaining how to get a keystroke backend on this host.
pub fn install_instructions() -> &'static str {
    if cfg!(target_os = "macos") {
        "osascript not found; keystroke injection needs Accessibility permission for System Events"
    } else if cfg!(windows) {
        "powershell not found; keystroke injection uses SendKeys"
    } else {
        "xdotool not found; install it with: sudo apt install xdotool (X11 session required)"
    }
}

fn binary_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

/// X11 keystrokes via `xdotool`.
pub struct XdotoolKeyboard;

impl XdotoolKeyboard {
    fn type_command(text: &str) -> Command {
        let mut cmd = Command::new("xdotool");
        cmd.args(["type", "--", text]);
        cmd
    }
}

impl Keyboard for XdotoolKeyboard {
    fn name(&self) -> &str {
        "xdotool"
    }

    fn is_available(&self) -> bool {
        binary_exists("xdotool")
    }

    fn type_text(&self, text: &str) -> Result<()> {
        run_checked(Self::type_command(text))
    }

    fn press_enter(&self) -> Result<()> {
        let mut cmd = Command::new("xdotool");
        cmd.args(["key", "Return"]);
        run_checked(cmd)
    }
}

/// macOS keystrokes via System Events.
pub struct AppleScriptKeyboard;

impl AppleScriptKeyboard {
    fn script_command(script: &str) -> Command {
        let mut cmd = Command::new("osascript");
        cmd.args(["-e", script]);
        cmd
    }

    fn keystroke_script(text: &str) -> String {
        let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
        format!("tell application \"System Events\" to keystroke \"{escaped}\"")
    }
}

impl Keyboard for AppleScriptKeyboard {
    fn name(&self) -> &str {
        "osascript"
    }

    fn is_available(&self) -> bool {
        binary_exists("osascript")
    }

    fn type_text(&self, text: &str) -> Result<()> {
        run_checked(Self::script_command(&Self::keystroke_script(text)))
    }

    fn press_enter(&self) -> Result<()> {
        // Key code 36 is Return.
        run_checked(Self::script_command(
            "tell application \"System Events\" to key code 36",
        ))
    }
}

/// Windows keystrokes via `System.Windows.Forms.SendKeys`.
pub struct SendKeysKeyboard;

impl SendKeysKeyboard {
    fn send_keys_command(keys: &str) -> Command {
        let script = format!(
            "Add-Type -AssemblyName System.Windows.Forms; [System.Windows.Forms.SendKeys]::SendWait('{}')",
            keys.replace('\'', "''")
        );
        let mut cmd = Command::new("powershell");
        cmd.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
        cmd
    }
}

impl Keyboard for SendKeysKeyboard {
    fn name(&self) -> &str {
        "sendkeys"
    }

    fn is_available(&self) -> bool {
        binary_exists("powershell")
    }

    fn type_text(&self, text: &str) -> Result<()> {
        run_checked(Self::send_keys_command(&escape_send_keys(text)))
    }

    fn press_enter(&self) -> Result<()> {
        run_checked(Self::send_keys_command("{ENTER}"))
    }
}

/// Brace the characters SendKeys treats as modifiers or groupings.
fn escape_send_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '+' | '^' | '%' | '~' | '(' | ')' | '{' | '}' | '[' | ']' => {
                out.push('{');
                out.push(c);
                out.push('}');
            }
            _ => out.push(c),
        }
    }
    out
}
