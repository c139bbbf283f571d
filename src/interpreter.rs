//! Utterance interpretation.
//!
//! Sends the raw utterance plus the user's context to the language model and
//! takes the trimmed reply as the [`Action`]. The model is expected to answer
//! in the dispatcher's grammar, but nothing here validates that.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::context::{ContextStore, UserId};
use crate::llm::{ChatRequest, LanguageModel};

/// System instruction for interpretation requests.
pub const INTERPRET_INSTRUCTION: &str =
    "You are a voice assistant. Respond with the specific action text only.";

/// Canonical instruction string produced by interpretation.
///
/// Immutable once produced; the dispatcher takes it by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action(String);

impl Action {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns utterances into actions using the language model and per-user context.
pub struct CommandInterpreter {
    llm: Arc<dyn LanguageModel>,
    context: Arc<ContextStore>,
}

impl CommandInterpreter {
    pub fn new(llm: Arc<dyn LanguageModel>, context: Arc<ContextStore>) -> Self {
        Self { llm, context }
    }

    /// Interpret `utterance` for `user`.
    ///
    /// Returns `None` when the service fails or replies with nothing usable.
    pub async fn interpret(&self, user: &UserId, utterance: &str) -> Option<Action> {
        let context = serde_json::Value::Object(self.context.get(user));
        let request = ChatRequest::new(
            INTERPRET_INSTRUCTION,
            format!("Command: {utterance}\nContext: {context}"),
        );

        match self.llm.complete(&request).await {
            Ok(reply) => {
                let action = reply.trim();
                if action.is_empty() {
                    warn!("error parsing command: empty response");
                    return None;
                }
                info!("parsed command: {action}");
                Some(Action::new(action))
            }
            Err(e) => {
                error!("error parsing command: {e}");
                None
            }
        }
    }
}
