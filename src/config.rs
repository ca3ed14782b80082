//! Configuration for the Ripple gateway
//!
//! All runtime settings come from the environment; secrets are wrapped in
//! [`SecretString`] so they never show up in debug output.

use secrecy::SecretString;

use crate::{Error, Result};

/// Default model identifier sent to the completion endpoint
pub const DEFAULT_MODEL: &str = "openai/gpt-4";

/// Default character budget for assembled thread history
pub const DEFAULT_HISTORY_BUDGET: usize = 4000;

/// Slack Web API base URL
const SLACK_API_BASE: &str = "https://slack.com/api";

/// OpenRouter API base URL (completion endpoint host)
const COMPLETION_API_BASE: &str = "https://openrouter.ai/api";

/// Ripple gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Slack signing secret for webhook signature verification.
    /// `None` is an operator fault surfaced on the first verified request.
    pub signing_secret: Option<SecretString>,

    /// Slack bot OAuth token (xoxb-...)
    pub bot_token: SecretString,

    /// The bot's own Slack user id, used for self-origin filtering and
    /// assistant role mapping
    pub bot_user_id: String,

    /// Bearer credential for the completion endpoint
    pub completion_api_key: SecretString,

    /// Fixed model identifier for completion calls
    pub model: String,

    /// Character budget for assembled thread history
    pub history_budget: usize,

    /// Slack Web API base URL (overridable for tests)
    pub slack_api_base: String,

    /// Completion API base URL (overridable for tests)
    pub completion_api_base: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads `SLACK_SIGNING_SECRET`, `SLACK_BOT_TOKEN`, `SLACK_BOT_USER_ID`,
    /// `OPENROUTER_API_KEY`, and the optional `RIPPLE_MODEL` and
    /// `RIPPLE_HISTORY_BUDGET` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is unset or a numeric
    /// override fails to parse.
    pub fn from_env() -> Result<Self> {
        let signing_secret = std::env::var("SLACK_SIGNING_SECRET")
            .ok()
            .map(SecretString::from);
        let bot_token = required("SLACK_BOT_TOKEN").map(SecretString::from)?;
        let bot_user_id = required("SLACK_BOT_USER_ID")?;
        let completion_api_key = required("OPENROUTER_API_KEY").map(SecretString::from)?;

        let model =
            std::env::var("RIPPLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let history_budget = match std::env::var("RIPPLE_HISTORY_BUDGET") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("RIPPLE_HISTORY_BUDGET is not a number: {raw}"))
            })?,
            Err(_) => DEFAULT_HISTORY_BUDGET,
        };

        Ok(Self {
            signing_secret,
            bot_token,
            bot_user_id,
            completion_api_key,
            model,
            history_budget,
            slack_api_base: SLACK_API_BASE.to_string(),
            completion_api_base: COMPLETION_API_BASE.to_string(),
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
}
