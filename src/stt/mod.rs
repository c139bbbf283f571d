//! Speech input: blocking capture of one transcribed utterance.
//!
//! The recognizer itself is external. [`CommandInput`] runs a recognizer
//! program per utterance and reads its transcript from stdout;
//! [`ConsoleInput`] reads typed utterances from stdin.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::NovaConfig;
use crate::error::{InputError, NovaError, Result};

/// Source of transcribed utterances.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Block until one utterance has been captured and transcribed.
    ///
    /// An empty string means nothing was said.
    async fn listen(&self) -> std::result::Result<String, InputError>;
}

/// Build the input described by `speech.input_command`.
///
/// # Errors
///
/// Returns [`NovaError::Config`] if the configured command line is empty.
pub fn from_config(config: &NovaConfig) -> Result<Box<dyn SpeechInput>> {
    match &config.speech.input_command {
        Some(command_line) => Ok(Box::new(CommandInput::new(command_line)?)),
        None => Ok(Box::new(ConsoleInput::new())),
    }
}

/// Runs an external recognizer once per utterance.
///
/// Exit status 0 with text on stdout is a transcript; exit status 0 with empty
/// stdout means no speech was understood; any other exit is a recognizer
/// failure. A program that cannot be started is reported as unavailable.
#[derive(Debug, Clone)]
pub struct CommandInput {
    program: String,
    args: Vec<String>,
}

impl CommandInput {
    pub fn new(command_line: &[String]) -> Result<Self> {
        let (program, args) = command_line
            .split_first()
            .ok_or_else(|| NovaError::Config("speech.input_command is empty".to_owned()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn capture(&self) -> std::result::Result<String, InputError> {
        let output = std::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| InputError::Unavailable(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InputError::Other(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if transcript.is_empty() {
            return Err(InputError::NoSpeech);
        }
        Ok(transcript)
    }
}

#[async_trait]
impl SpeechInput for CommandInput {
    async fn listen(&self) -> std::result::Result<String, InputError> {
        info!("listening for speech input");
        let this = self.clone();
        let transcript = tokio::task::spawn_blocking(move || this.capture())
            .await
            .map_err(|e| InputError::Other(format!("recognizer task failed: {e}")))??;
        info!("recognized speech: {transcript}");
        Ok(transcript)
    }
}

type LineSource = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;

/// Reads one utterance per line from stdin.
///
/// End of input is reported once as unavailable. After that `listen` never
/// completes, so the listen loop idles until it is cancelled.
pub struct ConsoleInput {
    lines: Mutex<Option<LineSource>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self::from_reader(tokio::io::stdin())
    }

    /// Read utterances from any line-oriented source.
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Mutex::new(Some(BufReader::new(reader).lines())),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechInput for ConsoleInput {
    async fn listen(&self) -> std::result::Result<String, InputError> {
        let mut guard = self.lines.lock().await;
        let Some(lines) = guard.as_mut() else {
            drop(guard);
            return std::future::pending().await;
        };
        info!("listening for typed input");
        match lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim().to_owned()),
            Ok(None) => {
                warn!("stdin closed, waiting for shutdown");
                *guard = None;
                Err(InputError::Unavailable("stdin closed".to_owned()))
            }
            Err(e) => Err(InputError::Other(e.to_string())),
        }
    }
}
