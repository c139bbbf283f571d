//! Shared fakes for integration tests.
//!
//! Every external collaborator of the assistant has a recording fake here, and
//! [`Harness`] wires them into real handlers, dispatcher and listen loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use nova::calendar::{CalendarService, ReminderRequest};
use nova::error::{InputError, NovaError, Result};
use nova::handlers::REWRITE_INSTRUCTION;
use nova::llm::{ChatRequest, LanguageModel};
use nova::platform::{Keyboard, ProcessControl};
use nova::stt::SpeechInput;
use nova::tts::{SpeechRenderer, SpeechWorker};
use nova::{
    ActionDispatcher, ActionHandlers, Collaborators, CommandInterpreter, ContextStore,
    HandlerSettings, ListenLoop, ProgramRegistry, SpeechOutputChannel, UserId,
};
use tokio::sync::Notify;

/// Utterance that makes [`EchoLlm`] panic mid-request.
pub(crate) const PANIC_COMMAND: &str = "self destruct";

/// Records every rendered line instead of producing audio.
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    lines: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl SpeechRenderer for RecordingRenderer {
    fn render(&self, text: &str) -> Result<()> {
        self.lines.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

/// Hands out scripted capture results, then waits forever.
#[derive(Default)]
pub(crate) struct ScriptedInput {
    script: Mutex<VecDeque<std::result::Result<String, InputError>>>,
    exhausted: Notify,
}

impl ScriptedInput {
    pub(crate) fn push(&self, result: std::result::Result<String, InputError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub(crate) fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Resolves once a capture was requested after the script ran out.
    pub(crate) async fn wait_exhausted(&self) {
        self.exhausted.notified().await;
    }
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    async fn listen(&self) -> std::result::Result<String, InputError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                self.exhausted.notify_one();
                std::future::pending().await
            }
        }
    }
}

/// Language model that answers with the command it was given.
///
/// Rewrite requests come back prefixed with `"Captain's log: "`.
#[derive(Default)]
pub(crate) struct EchoLlm {
    requests: Mutex<Vec<ChatRequest>>,
    unparseable: Mutex<Vec<String>>,
    fail_rewrite: Mutex<bool>,
}

impl EchoLlm {
    /// Fail interpretation of `command` as a service error.
    pub(crate) fn reject(&self, command: &str) {
        self.unparseable.lock().unwrap().push(command.to_owned());
    }

    pub(crate) fn fail_rewrites(&self) {
        *self.fail_rewrite.lock().unwrap() = true;
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for EchoLlm {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());

        if request.system == REWRITE_INSTRUCTION {
            if *self.fail_rewrite.lock().unwrap() {
                return Err(NovaError::Llm("HTTP 503: overloaded".to_owned()));
            }
            return Ok(format!("Captain's log: {}", request.user));
        }

        let command = request
            .user
            .strip_prefix("Command: ")
            .and_then(|rest| rest.split_once("\nContext: "))
            .map_or(request.user.as_str(), |(command, _)| command);
        if command == PANIC_COMMAND {
            panic!("language model exploded");
        }
        if self.unparseable.lock().unwrap().iter().any(|c| c == command) {
            return Err(NovaError::Llm("HTTP 500: internal error".to_owned()));
        }
        Ok(command.to_owned())
    }
}

/// Process control that records calls.
pub(crate) struct FakeProcesses {
    supports_terminate: bool,
    fail: Mutex<bool>,
    launched: Mutex<Vec<String>>,
    terminated: Mutex<Vec<String>>,
}

impl FakeProcesses {
    pub(crate) fn new(supports_terminate: bool) -> Self {
        Self {
            supports_terminate,
            fail: Mutex::new(false),
            launched: Mutex::new(Vec::new()),
            terminated: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn fail_all(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub(crate) fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }

    pub(crate) fn terminated(&self) -> Vec<String> {
        self.terminated.lock().unwrap().clone()
    }

    fn outcome(&self, executable: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(NovaError::Platform(format!("{executable} exited with code 1")));
        }
        Ok(())
    }
}

impl ProcessControl for FakeProcesses {
    fn name(&self) -> &str {
        "fake"
    }

    fn launch(&self, executable: &str) -> Result<()> {
        self.launched.lock().unwrap().push(executable.to_owned());
        self.outcome(executable)
    }

    fn supports_terminate(&self) -> bool {
        self.supports_terminate
    }

    fn terminate(&self, executable: &str) -> Result<()> {
        self.terminated.lock().unwrap().push(executable.to_owned());
        self.outcome(executable)
    }
}

/// Keyboard that records keystrokes as `type:<text>` and `enter`.
#[derive(Default)]
pub(crate) struct FakeKeyboard {
    keys: Mutex<Vec<String>>,
}

impl FakeKeyboard {
    pub(crate) fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

impl Keyboard for FakeKeyboard {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.keys.lock().unwrap().push(format!("type:{text}"));
        Ok(())
    }

    fn press_enter(&self) -> Result<()> {
        self.keys.lock().unwrap().push("enter".to_owned());
        Ok(())
    }
}

/// Calendar that records events and hands out sequential ids.
#[derive(Default)]
pub(crate) struct FakeCalendar {
    fail: Mutex<bool>,
    events: Mutex<Vec<ReminderRequest>>,
}

impl FakeCalendar {
    pub(crate) fn fail_all(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub(crate) fn events(&self) -> Vec<ReminderRequest> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarService for FakeCalendar {
    async fn create_event(&self, request: &ReminderRequest) -> Result<String> {
        self.events.lock().unwrap().push(request.clone());
        if *self.fail.lock().unwrap() {
            return Err(NovaError::Calendar("HTTP 401: invalid credentials".to_owned()));
        }
        Ok(format!("event-{}", self.events.lock().unwrap().len()))
    }
}

/// How to build a [`Harness`].
pub(crate) struct Setup {
    pub programs: Vec<(&'static str, &'static str)>,
    /// Windows-like process control when `true`.
    pub supports_terminate: bool,
    /// Whether a keystroke backend is installed.
    pub keyboard: bool,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            programs: vec![("notepad", "notepad.exe"), ("brave browser", "brave.exe")],
            supports_terminate: true,
            keyboard: true,
        }
    }
}

/// The assistant wired to fakes.
pub(crate) struct Harness {
    pub renderer: Arc<RecordingRenderer>,
    pub input: Arc<ScriptedInput>,
    pub llm: Arc<EchoLlm>,
    pub processes: Arc<FakeProcesses>,
    pub keyboard: Arc<FakeKeyboard>,
    pub calendar: Arc<FakeCalendar>,
    pub context: Arc<ContextStore>,
    pub handlers: Arc<ActionHandlers>,
    pub speech: SpeechOutputChannel,
    pub log_dir: tempfile::TempDir,
    worker: Option<SpeechWorker>,
}

impl Harness {
    /// Must be called inside a Tokio runtime.
    pub(crate) fn new(setup: Setup) -> Self {
        let renderer = Arc::new(RecordingRenderer::default());
        let (speech, worker) = SpeechOutputChannel::spawn(renderer.clone(), 64);
        let input = Arc::new(ScriptedInput::default());
        let llm = Arc::new(EchoLlm::default());
        let processes = Arc::new(FakeProcesses::new(setup.supports_terminate));
        let keyboard = Arc::new(FakeKeyboard::default());
        let calendar = Arc::new(FakeCalendar::default());
        let context = Arc::new(ContextStore::new());
        let log_dir = tempfile::tempdir().unwrap();

        let deps = Collaborators {
            speech: speech.clone(),
            input: input.clone(),
            llm: llm.clone(),
            calendar: calendar.clone(),
            processes: processes.clone(),
            keyboard: setup
                .keyboard
                .then(|| keyboard.clone() as Arc<dyn Keyboard>),
            context: context.clone(),
        };
        let settings = HandlerSettings {
            browser_program: "brave browser".to_owned(),
            search_settle_delay: Duration::ZERO,
            personal_log_dir: log_dir.path().join("logs"),
            rewrite_max_tokens: 150,
            reminder_time_zone: "America/Los_Angeles".to_owned(),
            reminder_length: TimeDelta::hours(1),
        };
        let registry = setup
            .programs
            .into_iter()
            .map(|(name, exe)| (name.to_owned(), exe.to_owned()))
            .collect::<ProgramRegistry>();
        let handlers = Arc::new(ActionHandlers::new(deps, registry, settings));

        Self {
            renderer,
            input,
            llm,
            processes,
            keyboard,
            calendar,
            context,
            handlers,
            speech,
            log_dir,
            worker: Some(worker),
        }
    }

    pub(crate) fn dispatcher(&self) -> ActionDispatcher {
        ActionDispatcher::new(self.handlers.clone())
    }

    pub(crate) fn listen_loop(&self) -> ListenLoop {
        ListenLoop::new(
            UserId::default(),
            self.input.clone(),
            CommandInterpreter::new(self.llm.clone(), self.context.clone()),
            self.dispatcher(),
            self.speech.clone(),
        )
        .with_retry_delay(Duration::ZERO)
    }

    /// Stop speech output and return everything that was spoken.
    pub(crate) async fn spoken(&mut self) -> Vec<String> {
        self.speech.shutdown().await.unwrap();
        if let Some(worker) = self.worker.take() {
            worker.join().await;
        }
        self.renderer.lines()
    }
}
