//! Text-to-speech through a platform speech command (`say`, `espeak`).

use std::process::Command;

use super::SpeechRenderer;
use crate::config::NovaConfig;
use crate::error::{NovaError, Result};

/// Renders speech by running an external TTS program once per utterance.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    voice: Option<String>,
}

impl CommandRenderer {
    /// Create a renderer from a full command line, e.g. `["espeak", "-s", "160"]`.
    ///
    /// # Errors
    ///
    /// Returns [`NovaError::Config`] if the command line is empty.
    pub fn new(command_line: &[String], voice: Option<String>) -> Result<Self> {
        let (program, args) = command_line
            .split_first()
            .ok_or_else(|| NovaError::Config("speech.tts_command is empty".to_owned()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            voice: voice.filter(|v| !v.trim().is_empty()),
        })
    }

    /// Build the renderer described by `speech.tts_command` and `voice_id`.
    pub fn from_config(config: &NovaConfig) -> Result<Self> {
        let command_line = config
            .speech
            .tts_command
            .clone()
            .unwrap_or_else(platform_default_command);
        Self::new(&command_line, Some(config.voice_id.clone()))
    }

    /// Program that will be executed.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_for(&self, text: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg(text);
        cmd
    }

    /// List the voices the TTS program reports.
    ///
    /// # Errors
    ///
    /// Returns [`NovaError::Unsupported`] for programs without a known voice
    /// listing flag, or [`NovaError::Speech`] if the listing fails.
    pub fn list_voices(&self) -> Result<Vec<String>> {
        let (args, skip_header): (&[&str], bool) = match self.program_stem() {
            "say" => (&["-v", "?"], false),
            "espeak" | "espeak-ng" => (&["--voices"], true),
            other => {
                return Err(NovaError::Unsupported(format!(
                    "voice listing is not available for {other}"
                )));
            }
        };

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| NovaError::Speech(format!("failed to run {}: {e}", self.program)))?;
        if !output.status.success() {
            return Err(NovaError::Speech(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Ok(parse_voice_listing(
            &String::from_utf8_lossy(&output.stdout),
            skip_header,
        ))
    }

    fn program_stem(&self) -> &str {
        std::path::Path::new(&self.program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.program)
    }
}

impl SpeechRenderer for CommandRenderer {
    fn render(&self, text: &str) -> Result<()> {
        let output = self
            .command_for(text)
            .output()
            .map_err(|e| NovaError::Speech(format!("failed to run {}: {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NovaError::Speech(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// The TTS command used when none is configured.
pub fn platform_default_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["say".to_owned()]
    } else {
        vec!["espeak".to_owned()]
    }
}

fn parse_voice_listing(stdout: &str, skip_header: bool) -> Vec<String> {
    stdout
        .lines()
        .skip(usize::from(skip_header))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
