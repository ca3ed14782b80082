//! Slack Events API webhook handler
//!
//! The handler does no outbound I/O. It authenticates the delivery, decodes
//! and classifies the payload, gates it through the dedup cache, enqueues a
//! background job for actionable events, and acknowledges immediately —
//! Slack marks slow deliveries failed and retries them.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::ApiState;
use crate::dispatch::MentionJob;
use crate::error::AuthError;
use crate::events::{self, Classification, EventEnvelope};

/// Slack's request timestamp header
const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Slack's request signature header
const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Acknowledgment body for every handled delivery except the handshake
#[derive(Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Handshake echo body
#[derive(Serialize)]
pub struct ChallengeResponse<'a> {
    pub challenge: &'a str,
}

fn ack() -> Response {
    (StatusCode::OK, Json(WebhookAck { ok: true })).into_response()
}

fn reject(status: StatusCode) -> Response {
    (status, Json(WebhookAck { ok: false })).into_response()
}

/// Handle one Slack Events API delivery
pub async fn handle_event(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);

    if let Err(e) = state.verifier.verify(timestamp, signature, &body) {
        return match e {
            AuthError::MissingSecret => {
                tracing::error!("signing secret not configured, rejecting delivery");
                reject(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AuthError::ExpiredTimestamp | AuthError::SignatureMismatch => {
                tracing::warn!(error = %e, "rejected unauthenticated delivery");
                reject(StatusCode::BAD_REQUEST)
            }
        };
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable webhook payload");
            return reject(StatusCode::BAD_REQUEST);
        }
    };

    let delivery_id = match &envelope {
        EventEnvelope::EventCallback { event_id, .. } => event_id.as_deref(),
        _ => None,
    };

    match events::classify(&envelope, &state.bot_user_id) {
        Classification::Handshake { challenge } => {
            tracing::info!("answering url_verification handshake");
            (StatusCode::OK, Json(ChallengeResponse { challenge })).into_response()
        }
        Classification::Ignore(reason) => {
            tracing::debug!(?reason, "ignoring event");
            ack()
        }
        Classification::Actionable(event) => {
            // Classification guarantees channel/ts, so a key always derives.
            let Some(key) = event.dedup_key(delivery_id) else {
                return ack();
            };
            if !state.should_process(&key) {
                tracing::debug!(key, "suppressing duplicate delivery");
                return ack();
            }

            let (Some(channel), Some(thread_ts)) =
                (event.channel.clone(), event.thread_root().map(String::from))
            else {
                return ack();
            };

            tracing::info!(channel = %channel, thread_ts = %thread_ts, "scheduling mention job");
            state.dispatcher.dispatch(MentionJob { channel, thread_ts });
            ack()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
