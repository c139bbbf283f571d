//! The listen loop: capture, interpret, dispatch, repeat.
//!
//! Turns run strictly one after another. A panic inside a turn is logged and
//! answered with an apology, and the loop carries on. The loop only ends when
//! an action asks it to stop or the cancellation token fires.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::context::UserId;
use crate::dispatch::{ActionDispatcher, Flow};
use crate::error::InputError;
use crate::interpreter::CommandInterpreter;
use crate::stt::SpeechInput;
use crate::tts::SpeechOutputChannel;

pub const GREETING: &str = "Hello, I am ready for your command";
pub const FAREWELL: &str = "Goodbye!";
pub const NO_SPEECH_PHRASE: &str = "I didn't catch that. Could you please repeat?";
pub const INPUT_UNAVAILABLE_PHRASE: &str = "There was an error with the speech recognition service.";
pub const INPUT_FAILED_PHRASE: &str = "An unexpected error occurred.";
pub const PARSE_ERROR_PHRASE: &str = "Error parsing command.";
pub const RESTART_PHRASE: &str = "There was an error. Restarting listening.";

/// Pause after the input service reports itself unavailable.
pub const INPUT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Why [`ListenLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A "stop listening" action.
    Terminated,
    /// The cancellation token fired.
    Cancelled,
}

pub struct ListenLoop {
    user: UserId,
    input: Arc<dyn SpeechInput>,
    interpreter: CommandInterpreter,
    dispatcher: ActionDispatcher,
    speech: SpeechOutputChannel,
    retry_delay: Duration,
}

impl ListenLoop {
    pub fn new(
        user: UserId,
        input: Arc<dyn SpeechInput>,
        interpreter: CommandInterpreter,
        dispatcher: ActionDispatcher,
        speech: SpeechOutputChannel,
    ) -> Self {
        Self {
            user,
            input,
            interpreter,
            dispatcher,
            speech,
            retry_delay: INPUT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run turns until an action terminates the loop or `cancel` fires.
    ///
    /// Either way the farewell has been spoken by the time this returns.
    pub async fn run(&self, cancel: CancellationToken) -> LoopExit {
        info!("listen loop started for {}", self.user);
        loop {
            let turn = AssertUnwindSafe(self.turn()).catch_unwind();
            let outcome = tokio::select! {
                () = cancel.cancelled() => {
                    info!("listen loop cancelled");
                    self.say_goodbye().await;
                    return LoopExit::Cancelled;
                }
                outcome = turn => outcome,
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Terminate) => {
                    info!("stop requested, leaving listen loop");
                    self.say_goodbye().await;
                    return LoopExit::Terminated;
                }
                Err(panic) => {
                    error!("error in continuous listening loop: {}", panic_message(&*panic));
                    self.speech.speak(RESTART_PHRASE);
                }
            }
        }
    }

    async fn say_goodbye(&self) {
        if let Err(e) = self.speech.speak_and_wait(FAREWELL).await {
            warn!("could not say goodbye: {e}");
        }
    }

    async fn turn(&self) -> Flow {
        let utterance = match self.input.listen().await {
            Ok(utterance) => utterance,
            Err(e) => {
                self.report_input_error(&e).await;
                return Flow::Continue;
            }
        };
        let utterance = utterance.trim();
        if utterance.is_empty() {
            debug!("empty utterance, listening again");
            return Flow::Continue;
        }
        info!("recognized speech: {utterance}");

        let Some(action) = self.interpreter.interpret(&self.user, utterance).await else {
            self.speech.speak(PARSE_ERROR_PHRASE);
            return Flow::Continue;
        };
        self.dispatcher.dispatch(&self.user, action).await
    }

    async fn report_input_error(&self, err: &InputError) {
        match err {
            InputError::NoSpeech => warn!("could not understand the audio"),
            _ => error!("speech input error: {err}"),
        }
        self.speech.speak(input_error_phrase(err));
        if matches!(err, InputError::Unavailable(_)) {
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

/// Apology spoken for a failed capture.
pub fn input_error_phrase(err: &InputError) -> &'static str {
    match err {
        InputError::NoSpeech => NO_SPEECH_PHRASE,
        InputError::Unavailable(_) => INPUT_UNAVAILABLE_PHRASE,
        InputError::Other(_) => INPUT_FAILED_PHRASE,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
