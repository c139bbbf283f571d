//! Language-model access.
//!
//! The assistant uses one chat completion service for two jobs: turning an
//! utterance into an action string, and rewriting dictated personal logs.
//! Both go through the [`LanguageModel`] trait so tests can substitute a fake.

pub mod api;

pub use api::OpenAiClient;

use async_trait::async_trait;

use crate::error::Result;

/// A single-turn chat completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System instruction.
    pub system: String,
    /// User message.
    pub user: String,
    /// Optional cap on generated tokens.
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Request/response contract with the external language-model service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one request and return the response text verbatim.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}
