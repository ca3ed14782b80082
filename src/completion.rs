//! Chat completion gateway
//!
//! One synchronous POST per job to an OpenAI-compatible
//! `/v1/chat/completions` endpoint. No retry lives here: a failure is final
//! and the caller decides what the thread sees.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::context::{ConversationContext, HistoryTurn};
use crate::error::CompletionError;

/// Per-request timeout so a hung completion host cannot pin a worker
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the remote completion endpoint
#[derive(Debug, Clone)]
pub struct CompletionClient {
    api_base: String,
    api_key: SecretString,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [HistoryTurn],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionClient {
    /// Create a new completion client.
    ///
    /// `api_base` is the host root (e.g. `https://openrouter.ai/api`); the
    /// `/v1/chat/completions` path is appended per call.
    #[must_use]
    pub fn new(api_base: String, api_key: SecretString, model: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Send the assembled context and return the generated reply text.
    ///
    /// # Errors
    ///
    /// [`CompletionError::Upstream`] for a non-2xx status,
    /// [`CompletionError::Transport`] for network-level failures, and
    /// [`CompletionError::EmptyReply`] when a 2xx response carries no
    /// `choices[0].message.content`.
    pub async fn complete(
        &self,
        context: &ConversationContext,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: &context.turns,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Upstream(status));
        }

        let data: ChatResponse = response.json().await?;
        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyReply)
    }
}
