//! Nova: a voice-driven command assistant.
//!
//! Each turn of the assistant runs one pass of a short pipeline:
//! Speech input → Interpreter → Dispatcher → Handler → Spoken feedback
//!
//! # Architecture
//!
//! - **Speech input** ([`stt`]): blocking capture of one transcribed utterance
//! - **Interpreter** ([`interpreter`]): a language model turns the utterance and
//!   the user's stored context into a canonical action string
//! - **Dispatcher** ([`dispatch`]): ordered first-match routing of the action
//! - **Handlers** ([`handlers`]): launch or close programs, search the web,
//!   report the time, record personal logs, set calendar reminders
//! - **Speech output** ([`tts`]): one queue and one consumer, so spoken
//!   feedback never overlaps
//!
//! All state is created by the binary and passed in explicitly, so every
//! collaborator can be replaced by a fake in tests.

pub mod calendar;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod interpreter;
pub mod listen;
pub mod llm;
pub mod logging;
pub mod platform;
pub mod registry;
pub mod stt;
pub mod tts;

pub use config::NovaConfig;
pub use context::{Context, ContextStore, UserId};
pub use dispatch::{ActionDispatcher, Flow, Route};
pub use error::{InputError, NovaError, Result};
pub use handlers::{ActionHandlers, Collaborators, HandlerSettings};
pub use interpreter::{Action, CommandInterpreter};
pub use listen::{ListenLoop, LoopExit};
pub use registry::ProgramRegistry;
pub use tts::{SpeechOutputChannel, SpeechWorker};
