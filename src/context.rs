//! Conversation context assembly from Slack thread history
//!
//! Turns a thread listing into the ordered role/content list sent to the
//! completion endpoint. The budget policy prefers the most recent messages:
//! walking newest to oldest, a message is kept only while the running
//! character total stays within budget, so truncation always removes the
//! oldest end and the result stays chronological.

use std::sync::Arc;

use serde::Serialize;

use crate::channels::{SlackChannel, SlackMessage};

/// Speaker of one history turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One normalized message in the conversation history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

/// Chronologically ordered history, oldest first, within the char budget
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    pub turns: Vec<HistoryTurn>,
}

impl ConversationContext {
    /// True when no turn carries any prompt text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total characters across all turn contents
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.turns.iter().map(|t| t.content.chars().count()).sum()
    }
}

/// Fetches and normalizes thread history under a character budget.
#[derive(Debug, Clone)]
pub struct HistoryAssembler {
    slack: Arc<SlackChannel>,
    bot_user_id: String,
    budget: usize,
}

impl HistoryAssembler {
    #[must_use]
    pub fn new(slack: Arc<SlackChannel>, bot_user_id: String, budget: usize) -> Self {
        Self {
            slack,
            bot_user_id,
            budget,
        }
    }

    /// Assemble the context for the thread rooted at `thread_ts`.
    ///
    /// A fetch failure degrades to an empty context: the caller falls back
    /// to the prompt-missing reply instead of crashing the job.
    pub async fn assemble(&self, channel: &str, thread_ts: &str) -> ConversationContext {
        match self.slack.fetch_replies(channel, thread_ts).await {
            Ok(messages) => build_context(messages, &self.bot_user_id, self.budget),
            Err(e) => {
                tracing::warn!(channel, thread_ts, error = %e, "thread history fetch failed, proceeding with empty context");
                ConversationContext::default()
            }
        }
    }
}

/// Normalize a thread listing into a budgeted, chronological context.
#[must_use]
pub fn build_context(
    mut messages: Vec<SlackMessage>,
    bot_user_id: &str,
    budget: usize,
) -> ConversationContext {
    // The listing order is not guaranteed; sort by numeric ts ascending.
    messages.sort_by(|a, b| ts_value(a).total_cmp(&ts_value(b)));

    let turns: Vec<HistoryTurn> = messages
        .into_iter()
        .filter_map(|msg| {
            let role = if msg.user.as_deref() == Some(bot_user_id) {
                Role::Assistant
            } else {
                Role::User
            };
            let content = strip_bot_mention(msg.text.as_deref().unwrap_or(""), bot_user_id);
            if content.is_empty() {
                // A bare mention carries no prompt text.
                None
            } else {
                Some(HistoryTurn { role, content })
            }
        })
        .collect();

    // Keep the newest messages that fit, then restore chronological order.
    let mut kept = Vec::new();
    let mut total = 0usize;
    for turn in turns.into_iter().rev() {
        let len = turn.content.chars().count();
        if total + len > budget {
            break;
        }
        total += len;
        kept.push(turn);
    }
    kept.reverse();

    ConversationContext { turns: kept }
}

fn ts_value(msg: &SlackMessage) -> f64 {
    msg.ts
        .as_deref()
        .and_then(|ts| ts.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Remove this bot's `<@UID>` mention markup and surrounding whitespace.
fn strip_bot_mention(text: &str, bot_user_id: &str) -> String {
    text.replace(&format!("<@{bot_user_id}>"), "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "UBOT";

    fn msg(user: &str, text: &str, ts: &str) -> SlackMessage {
        SlackMessage {
            user: Some(user.to_string()),
            text: Some(text.to_string()),
            ts: Some(ts.to_string()),
        }
    }

    #[test]
    fn within_budget_keeps_everything_in_order_with_roles() {
        let messages = vec![
            msg("U1", "hi", "1.000100"),
            msg(BOT, "hello", "1.000200"),
            msg("U1", "<@UBOT> summarize", "1.000300"),
        ];
        let ctx = build_context(messages, BOT, 1000);
        assert_eq!(ctx.turns.len(), 3);
        assert_eq!(ctx.turns[0].role, Role::User);
        assert_eq!(ctx.turns[0].content, "hi");
        assert_eq!(ctx.turns[1].role, Role::Assistant);
        assert_eq!(ctx.turns[2].content, "summarize");
    }

    #[test]
    fn unsorted_listing_is_normalized_chronologically() {
        let messages = vec![
            msg("U1", "third", "3.0"),
            msg("U1", "first", "1.0"),
            msg("U1", "second", "2.0"),
        ];
        let ctx = build_context(messages, BOT, 1000);
        let contents: Vec<&str> = ctx.turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn over_budget_keeps_a_chronological_suffix() {
        let messages = vec![
            msg("U1", "aaaaa", "1.0"),
            msg("U1", "bbbbb", "2.0"),
            msg("U1", "ccccc", "3.0"),
        ];
        let ctx = build_context(messages, BOT, 10);
        let contents: Vec<&str> = ctx.turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["bbbbb", "ccccc"]);
        assert!(ctx.char_len() <= 10);
    }

    #[test]
    fn budget_cuts_before_exceeding_not_after() {
        let messages = vec![msg("U1", "aaaa", "1.0"), msg("U1", "bbbb", "2.0")];
        let ctx = build_context(messages, BOT, 7);
        let contents: Vec<&str> = ctx.turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["bbbb"]);
    }

    #[test]
    fn bare_mention_and_empty_text_are_dropped() {
        let messages = vec![
            msg("U1", "<@UBOT>", "1.0"),
            SlackMessage {
                user: Some("U2".to_string()),
                text: None,
                ts: Some("2.0".to_string()),
            },
        ];
        let ctx = build_context(messages, BOT, 1000);
        assert!(ctx.is_empty());
    }

    #[test]
    fn missing_author_maps_to_user_role() {
        let messages = vec![SlackMessage {
            user: None,
            text: Some("note".to_string()),
            ts: Some("1.0".to_string()),
        }];
        let ctx = build_context(messages, BOT, 1000);
        assert_eq!(ctx.turns[0].role, Role::User);
    }
}
