//! Slack Events API payload decoding and classification
//!
//! Every webhook body decodes into an [`EventEnvelope`]; classification then
//! decides whether the gateway echoes a handshake, ignores the event, or
//! schedules background work. Ignoring is an explicit outcome with a reason
//! so the decision is auditable in logs and tests.

use serde::Deserialize;

/// Top-level Events API payload
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum EventEnvelope {
    /// One-time endpoint ownership handshake
    #[serde(rename = "url_verification")]
    UrlVerification { challenge: String },
    /// A real event delivery
    #[serde(rename = "event_callback")]
    EventCallback {
        /// Slack's delivery id, stable across retries of one event
        #[serde(default)]
        event_id: Option<String>,
        event: MessageEvent,
    },
    /// Anything else the platform may send
    #[serde(other)]
    Other,
}

/// Inner event record. All fields beyond the type are optional so that
/// non-message event kinds still decode (and classify as ignorable) instead
/// of failing the whole delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    /// Event kind ("app_mention", "message", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Author user id
    #[serde(default)]
    pub user: Option<String>,
    /// Present when the message originated from a bot
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Channel id
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique within the channel)
    #[serde(default)]
    pub ts: Option<String>,
    /// Thread root timestamp, set only for replies
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// Message text
    #[serde(default)]
    pub text: Option<String>,
    /// Conversation kind ("im" for direct messages)
    #[serde(default)]
    pub channel_type: Option<String>,
}

impl MessageEvent {
    /// Thread root this event belongs to: its `thread_ts` when replying,
    /// otherwise its own `ts` starts the thread.
    #[must_use]
    pub fn thread_root(&self) -> Option<&str> {
        self.thread_ts.as_deref().or(self.ts.as_deref())
    }

    /// Duplicate-suppression key: Slack's delivery id when present, else
    /// channel + event timestamp.
    #[must_use]
    pub fn dedup_key(&self, delivery_id: Option<&str>) -> Option<String> {
        if let Some(id) = delivery_id {
            return Some(id.to_string());
        }
        match (self.channel.as_deref(), self.ts.as_deref()) {
            (Some(channel), Some(ts)) => Some(format!("{channel}:{ts}")),
            _ => None,
        }
    }
}

/// Outcome of classifying a decoded payload
#[derive(Debug)]
pub enum Classification<'a> {
    /// Echo the challenge token verbatim
    Handshake { challenge: &'a str },
    /// Drop the event, with the reason recorded
    Ignore(IgnoreReason),
    /// Schedule background processing
    Actionable(&'a MessageEvent),
}

/// Why an event was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Bot-origin marker present or authored by this bot itself
    SelfOriginated,
    /// No author field; a system or malformed event
    MissingAuthor,
    /// Missing the channel/ts coordinates needed to act on it
    MissingCoordinates,
    /// An event kind this gateway does not handle
    UnhandledKind,
}

/// Classify a decoded payload against this gateway's own bot identity.
///
/// Self-origin filtering comes first: without it the bot's replies would
/// re-trigger the pipeline in an infinite loop.
#[must_use]
pub fn classify<'a>(envelope: &'a EventEnvelope, bot_user_id: &str) -> Classification<'a> {
    let event = match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            return Classification::Handshake { challenge };
        }
        EventEnvelope::EventCallback { event, .. } => event,
        EventEnvelope::Other => return Classification::Ignore(IgnoreReason::UnhandledKind),
    };

    if event.bot_id.is_some() || event.user.as_deref() == Some(bot_user_id) {
        return Classification::Ignore(IgnoreReason::SelfOriginated);
    }
    if event.user.is_none() {
        return Classification::Ignore(IgnoreReason::MissingAuthor);
    }

    let is_mention = event.kind == "app_mention";
    let is_direct = event.kind == "message" && event.channel_type.as_deref() == Some("im");
    if !is_mention && !is_direct {
        return Classification::Ignore(IgnoreReason::UnhandledKind);
    }

    if event.channel.is_none() || event.ts.is_none() {
        return Classification::Ignore(IgnoreReason::MissingCoordinates);
    }

    Classification::Actionable(event)
}
