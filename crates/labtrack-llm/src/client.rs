//! Chat-completions client for query synthesis.
//!
//! Behind the `remote` feature: callers without network access (or in
//! tests) use [`crate::MockSynthesizer`] instead. The API key is supplied
//! by the caller; nothing is embedded here.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::prompts;
use crate::synthesis;

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// A blocking chat-completions client that returns extracted query strings.
pub struct RemoteSynthesizer {
    endpoint: String,
    api_key: String,
    model: String,
    http: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl RemoteSynthesizer {
    /// Create a client against the default endpoint.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string(), api_key, model)
    }

    /// Create a client against a custom endpoint (self-hosted gateways).
    pub fn with_endpoint(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            endpoint,
            api_key,
            model,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Ask the model for a query answering `request` over `schema`.
    ///
    /// Returns the extracted query string; the caller still has to run it
    /// through the core's validating execution boundary.
    pub fn synthesize(&self, schema: &str, request: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompts::SYSTEM_PROMPT },
                { "role": "user", "content": prompts::make_query_prompt(schema, request) },
            ],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("query synthesis request failed")?
            .error_for_status()
            .context("query synthesis request was refused")?;

        let parsed: ChatResponse = response
            .json()
            .context("invalid chat completion payload")?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| anyhow!("chat completion reply has no choices"))?;

        let query = synthesis::extract_query(content)?;
        log::debug!("synthesized query: {}", query);
        Ok(query)
    }
}
