//! Routing of actions to handlers.
//!
//! Rules are checked in a fixed order and the first match wins. Some rules
//! match a prefix and others a substring, so an action can satisfy several
//! rules; the order below decides. For example `"set reminder to search the
//! web"` is a web search for `"the web"` because the search rule comes first.

use std::sync::Arc;

use tracing::info;

use crate::context::UserId;
use crate::handlers::ActionHandlers;
use crate::interpreter::Action;

/// What the listen loop should do after an action has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The user asked to stop; the loop says goodbye and exits.
    Terminate,
}

/// The handler an action routes to, with its extracted argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    OpenProgram(&'a str),
    CloseProgram(&'a str),
    ReportTime,
    WebSearch(&'a str),
    StartPersonalLog,
    SetReminder(&'a str),
    Terminate,
    Unrecognized,
}

impl<'a> Route<'a> {
    /// Pick the route for `action`.
    pub fn parse(action: &'a str) -> Self {
        if let Some(name) = action.strip_prefix("open ") {
            Self::OpenProgram(name.trim())
        } else if let Some(name) = action.strip_prefix("close ") {
            Self::CloseProgram(name.trim())
        } else if action.contains("current time") {
            Self::ReportTime
        } else if let Some(query) = text_after(action, "search ") {
            Self::WebSearch(query)
        } else if action.contains("start personal log") {
            Self::StartPersonalLog
        } else if action.contains("set reminder") {
            // Without trailing details the whole action becomes the summary.
            Self::SetReminder(text_after(action, "set reminder ").unwrap_or(action.trim()))
        } else if action.contains("stop listening") {
            Self::Terminate
        } else {
            Self::Unrecognized
        }
    }

    /// Position of the matching rule in the precedence order, starting at 1.
    pub fn rule_index(&self) -> usize {
        match self {
            Self::OpenProgram(_) => 1,
            Self::CloseProgram(_) => 2,
            Self::ReportTime => 3,
            Self::WebSearch(_) => 4,
            Self::StartPersonalLog => 5,
            Self::SetReminder(_) => 6,
            Self::Terminate => 7,
            Self::Unrecognized => 8,
        }
    }
}

/// Trimmed text following the first occurrence of `marker`.
fn text_after<'a>(action: &'a str, marker: &str) -> Option<&'a str> {
    action
        .find(marker)
        .map(|start| action[start + marker.len()..].trim())
}

/// Runs the handler chosen by [`Route::parse`].
pub struct ActionDispatcher {
    handlers: Arc<ActionHandlers>,
}

impl ActionDispatcher {
    pub fn new(handlers: Arc<ActionHandlers>) -> Self {
        Self { handlers }
    }

    /// Handle `action` on behalf of `user`.
    pub async fn dispatch(&self, user: &UserId, action: Action) -> Flow {
        let route = Route::parse(action.as_str());
        info!("executing action: {action} ({route:?})");

        match route {
            Route::OpenProgram(name) => self.handlers.open_program(name).await,
            Route::CloseProgram(name) => self.handlers.close_program(name).await,
            Route::ReportTime => self.handlers.report_time(),
            Route::WebSearch(query) => self.handlers.web_search(query).await,
            Route::StartPersonalLog => self.handlers.start_personal_log(user).await,
            Route::SetReminder(details) => self.handlers.set_reminder(details).await,
            Route::Terminate => return Flow::Terminate,
            Route::Unrecognized => self.handlers.unrecognized(),
        }
        Flow::Continue
    }
}
