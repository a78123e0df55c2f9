//! Protocol configuration, built once at startup and shared read-only.

use std::time::Duration as StdDuration;

use chrono::Duration;

use credex_crypto::HmacSecret;
use credex_vc::Jwk;

/// Offer token lifetime and credential validity window.
pub const DEFAULT_OFFER_TTL_SECS: i64 = 15 * 60;

/// Retention of pending presentation requests.
pub const DEFAULT_REQUEST_TTL_SECS: i64 = 15 * 60;

/// Bound on each toolkit call.
pub const DEFAULT_TOOLKIT_TIMEOUT_MS: u64 = 5_000;

/// Longest accepted offer or request lifetime: ten years.
pub const MAX_TTL_SECS: i64 = 10 * 366 * 24 * 60 * 60;

/// Secrets and lifetimes the offer and exchange services run with.
#[derive(Clone)]
pub struct ProtocolConfig {
    /// Key for offer-token HMACs.
    pub hmac_secret: HmacSecret,
    /// Long-lived issuer signing key.
    pub issuer_key: Jwk,
    /// How long a minted token stays redeemable, and how long an issued
    /// credential is valid.
    pub offer_ttl: Duration,
    /// How long a presentation request stays answerable.
    pub request_ttl: Duration,
    /// Bound on each toolkit call.
    pub toolkit_timeout: StdDuration,
}

impl ProtocolConfig {
    /// Configuration with default lifetimes.
    pub fn new(hmac_secret: HmacSecret, issuer_key: Jwk) -> Self {
        Self {
            hmac_secret,
            issuer_key,
            offer_ttl: Duration::seconds(DEFAULT_OFFER_TTL_SECS),
            request_ttl: Duration::seconds(DEFAULT_REQUEST_TTL_SECS),
            toolkit_timeout: StdDuration::from_millis(DEFAULT_TOOLKIT_TIMEOUT_MS),
        }
    }
}

impl std::fmt::Debug for ProtocolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolConfig")
            .field("hmac_secret", &"[REDACTED]")
            .field("issuer_key", &"[REDACTED]")
            .field("offer_ttl", &self.offer_ttl)
            .field("request_ttl", &self.request_ttl)
            .field("toolkit_timeout", &self.toolkit_timeout)
            .finish()
    }
}
