//! Slack webhook request signature verification
//!
//! Slack signs each delivery with `v0=` + hex(HMAC-SHA256(secret,
//! `v0:{timestamp}:{body}`)) and sends the timestamp alongside. Freshness is
//! checked before any HMAC work so stale replays are rejected cheaply.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Version prefix on both the signing string and the signature header
const SIGNATURE_VERSION: &str = "v0";

/// Maximum allowed skew between the request timestamp and now, in seconds
pub const REPLAY_WINDOW_SECS: i64 = 300;

/// Verifies that inbound webhook requests originate from Slack and are fresh.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    signing_secret: Option<SecretString>,
}

impl SignatureVerifier {
    #[must_use]
    pub fn new(signing_secret: Option<SecretString>) -> Self {
        Self { signing_secret }
    }

    /// Verify a request against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] when no signing secret is
    /// configured, [`AuthError::ExpiredTimestamp`] when the timestamp header
    /// is absent, unparseable, or outside the replay window, and
    /// [`AuthError::SignatureMismatch`] for any signature failure.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), AuthError> {
        self.verify_at(timestamp, signature, body, Utc::now().timestamp())
    }

    /// Verify a request against an explicit epoch-second clock.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::verify`].
    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), AuthError> {
        let secret = self
            .signing_secret
            .as_ref()
            .ok_or(AuthError::MissingSecret)?;

        // Freshness first: no HMAC work for stale or clockless requests.
        let ts = timestamp
            .and_then(|t| t.parse::<i64>().ok())
            .ok_or(AuthError::ExpiredTimestamp)?;
        if (now - ts).abs() > REPLAY_WINDOW_SECS {
            return Err(AuthError::ExpiredTimestamp);
        }

        let provided = signature
            .and_then(|s| s.strip_prefix(&format!("{SIGNATURE_VERSION}=")))
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
            .ok_or(AuthError::SignatureMismatch)?;

        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::SignatureMismatch)?;
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.unwrap_or_default().as_bytes());
        mac.update(b":");
        mac.update(body);

        // Constant-time comparison.
        mac.verify_slice(&provided)
            .map_err(|_| AuthError::SignatureMismatch)
    }
}

/// Compute the `v0=`-prefixed hex signature for a body at a timestamp.
///
/// Shared with the integration tests, which need to forge valid deliveries.
#[must_use]
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{SIGNATURE_VERSION}:{timestamp}:").as_bytes());
    mac.update(body);
    format!(
        "{SIGNATURE_VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    )
}
