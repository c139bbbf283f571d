//! OpenAI-compatible chat completions client.
//!
//! Works with the OpenAI API itself and any server exposing
//! `/v1/chat/completions` (Ollama, vLLM, llama.cpp server, ...).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{ChatRequest, LanguageModel};
use crate::config::NovaConfig;
use crate::error::{NovaError, Result};

/// Non-streaming chat completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client for `api_url` (with or without a trailing `/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`NovaError::Llm`] if the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NovaError::Llm(format!("failed to build HTTP client: {e}")))?;
        let endpoint = completions_endpoint(api_url);
        let model = model.into();
        info!("LLM configured: {endpoint} model={model}");
        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
        })
    }

    /// Build the client described by the `[llm]` section and `openai_api_key`.
    pub fn from_config(config: &NovaConfig) -> Result<Self> {
        Self::new(
            &config.llm.api_url,
            config.llm.model.clone(),
            config.resolved_api_key(),
            Duration::from_secs(config.llm.timeout_secs),
        )
    }

    fn request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user},
            ],
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let mut http = self.client.post(&self.endpoint);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| NovaError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NovaError::Llm(format!(
                "HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body)
            )));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NovaError::Llm(format!("malformed response: {e}")))?;
        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| NovaError::Llm("response missing message content".to_owned()))?;

        debug!("LLM response: {content}");
        Ok(content.to_owned())
    }
}

fn completions_endpoint(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    let base = base.strip_suffix("/v1").unwrap_or(base);
    format!("{base}/v1/chat/completions")
}

/// Extract an error message from an OpenAI error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}
