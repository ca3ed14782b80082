//! HTTP server for the Ripple gateway

pub mod health;
pub mod webhooks;

use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::dedup::EventDedup;
use crate::dispatch::Dispatcher;
use crate::signature::SignatureVerifier;
use crate::Result;

/// Shared state for webhook handlers
pub struct ApiState {
    /// Request authenticator
    pub verifier: SignatureVerifier,
    /// This gateway's own bot identity, for classification
    pub bot_user_id: String,
    /// Seen-delivery cache; the mutex makes check-and-record atomic
    pub dedup: Mutex<EventDedup>,
    /// Background work submission
    pub dispatcher: Dispatcher,
}

impl ApiState {
    /// Atomic check-and-record against the dedup cache.
    pub fn should_process(&self, key: &str) -> bool {
        self.dedup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_process(key)
    }
}

/// Build the gateway router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .nest("/slack", webhooks::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}

/// Bind and run the gateway server
///
/// # Errors
///
/// Returns [`crate::Error::Config`] if the listener fails to bind or the
/// server exits with an error.
pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| crate::Error::Config(format!("failed to bind webhook server: {e}")))?;

    tracing::info!(port, "webhook server listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| crate::Error::Config(format!("webhook server error: {e}")))?;

    Ok(())
}
