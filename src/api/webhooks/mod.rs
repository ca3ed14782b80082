//! Webhook endpoints for chat-platform event delivery

use std::sync::Arc;

use axum::{routing::post, Router};

use super::ApiState;

pub mod slack;

/// Build the webhooks router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/events", post(slack::handle_event))
        .with_state(state)
}
