//! Slack Web API client
//!
//! Owns the two outbound Slack operations the gateway needs: listing the
//! replies of a thread and posting a threaded reply. Constructed once at
//! startup and injected wherever it is used.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-request timeout so a hung Slack endpoint cannot pin a worker
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack Web API client
#[derive(Debug, Clone)]
pub struct SlackChannel {
    api_base: String,
    bot_token: SecretString,
    client: reqwest::Client,
}

/// Slack API response wrapper
#[derive(Debug, Deserialize)]
struct SlackResponse<T> {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    data: Option<T>,
}

/// Chat post message request
#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

/// `conversations.replies` payload
#[derive(Debug, Deserialize)]
struct RepliesData {
    #[serde(default)]
    messages: Vec<SlackMessage>,
}

/// One message record from a thread listing
#[derive(Debug, Clone, Deserialize)]
pub struct SlackMessage {
    /// Author user id (absent for some system messages)
    #[serde(default)]
    pub user: Option<String>,
    /// Message text
    #[serde(default)]
    pub text: Option<String>,
    /// Message timestamp
    #[serde(default)]
    pub ts: Option<String>,
}

impl SlackChannel {
    /// Create a new Slack client.
    ///
    /// `api_base` is the Web API root (`https://slack.com/api` in
    /// production; tests point it at a local mock).
    #[must_use]
    pub fn new(api_base: String, bot_token: SecretString) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    /// List all replies in the thread rooted at `thread_ts`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure and [`Error::Slack`]
    /// when the API answers `ok: false` or an unexpected shape.
    pub async fn fetch_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<SlackMessage>> {
        let response = self
            .client
            .get(format!("{}/conversations.replies", self.api_base))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(self.bot_token.expose_secret())
            .query(&[("channel", channel), ("ts", thread_ts), ("limit", "200")])
            .send()
            .await?;

        let result: SlackResponse<RepliesData> = response
            .json()
            .await
            .map_err(|e| Error::Slack(format!("replies parse error: {e}")))?;

        if !result.ok {
            return Err(Error::Slack(format!(
                "conversations.replies failed: {}",
                result.error.unwrap_or_default()
            )));
        }

        Ok(result.data.map(|d| d.messages).unwrap_or_default())
    }

    /// Post `text` into `channel`, threaded under `thread_ts` when given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure and [`Error::Slack`]
    /// when the API answers `ok: false`.
    pub async fn post_message(
        &self,
        channel: &str,
        thread_ts: Option<&str>,
        text: &str,
    ) -> Result<()> {
        let request = PostMessageRequest {
            channel,
            text,
            thread_ts,
        };

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(self.bot_token.expose_secret())
            .json(&request)
            .send()
            .await?;

        let result: SlackResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::Slack(format!("post parse error: {e}")))?;

        if !result.ok {
            return Err(Error::Slack(format!(
                "chat.postMessage failed: {}",
                result.error.unwrap_or_default()
            )));
        }

        tracing::debug!(channel, thread_ts = ?thread_ts, "slack reply posted");
        Ok(())
    }
}
