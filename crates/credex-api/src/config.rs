//! # Server Configuration
//!
//! Read once from the environment at startup. Invalid values are startup
//! errors; only absent variables fall back to defaults.

use std::time::Duration;

use thiserror::Error;

use credex_crypto::HmacSecret;
use credex_protocol::config::{
    DEFAULT_OFFER_TTL_SECS, DEFAULT_REQUEST_TTL_SECS, DEFAULT_TOOLKIT_TIMEOUT_MS, MAX_TTL_SECS,
};
use credex_vc::Jwk;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default eviction sweep period.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Longest accepted toolkit timeout: one hour.
pub const MAX_TOOLKIT_TIMEOUT_MS: u64 = 60 * 60 * 1_000;

/// Longest accepted sweep period: one day.
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Errors loading [`AppConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value is unusable.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        /// The variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `ISSUER_KEY` is not a usable private JWK.
    #[error("invalid ISSUER_KEY: {0}")]
    InvalidIssuerKey(String),

    /// `HMAC_SECRET` is set but empty.
    #[error("HMAC_SECRET must not be empty")]
    EmptySecret,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Server configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Offer token secret. `None` means generate an ephemeral one.
    pub hmac_secret: Option<HmacSecret>,
    /// Issuer signing key. `None` means generate an ephemeral one.
    pub issuer_key: Option<Jwk>,
    /// Base URL for offer and presentation URLs. `None` means derive it from
    /// the request's `Host` header.
    pub public_url: Option<String>,
    /// Offer token lifetime and credential validity.
    pub offer_ttl: chrono::Duration,
    /// Presentation request retention.
    pub request_ttl: chrono::Duration,
    /// Bound on each toolkit call.
    pub toolkit_timeout: Duration,
    /// Eviction sweep period.
    pub sweep_interval: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(v) => v.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                var: "PORT",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let hmac_secret = match lookup("HMAC_SECRET") {
            Some(v) => Some(HmacSecret::new(v.into_bytes()).map_err(|_| ConfigError::EmptySecret)?),
            None => None,
        };

        let issuer_key = match lookup("ISSUER_KEY") {
            Some(v) => {
                let key = Jwk::from_json(&v)
                    .map_err(|e| ConfigError::InvalidIssuerKey(e.to_string()))?;
                if !key.is_private() {
                    return Err(ConfigError::InvalidIssuerKey("no private key".into()));
                }
                Some(key)
            }
            None => None,
        };

        let public_url = lookup("PUBLIC_URL").map(|v| v.trim_end_matches('/').to_string());

        let max_ttl = MAX_TTL_SECS as u64;
        let offer_secs = bounded(&lookup, "OFFER_TTL_SECS", DEFAULT_OFFER_TTL_SECS as u64, max_ttl)?;
        let request_secs =
            bounded(&lookup, "REQUEST_TTL_SECS", DEFAULT_REQUEST_TTL_SECS as u64, max_ttl)?;
        let toolkit_ms = bounded(
            &lookup,
            "TOOLKIT_TIMEOUT_MS",
            DEFAULT_TOOLKIT_TIMEOUT_MS,
            MAX_TOOLKIT_TIMEOUT_MS,
        )?;
        let sweep_secs = bounded(
            &lookup,
            "SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
            MAX_SWEEP_INTERVAL_SECS,
        )?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected text or json".into(),
                })
            }
        };

        Ok(Self {
            port,
            hmac_secret,
            issuer_key,
            public_url,
            offer_ttl: seconds(offer_secs, "OFFER_TTL_SECS")?,
            request_ttl: seconds(request_secs, "REQUEST_TTL_SECS")?,
            toolkit_timeout: Duration::from_millis(toolkit_ms),
            sweep_interval: Duration::from_secs(sweep_secs),
            log_format,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hmac_secret: None,
            issuer_key: None,
            public_url: None,
            offer_ttl: chrono::Duration::seconds(DEFAULT_OFFER_TTL_SECS),
            request_ttl: chrono::Duration::seconds(DEFAULT_REQUEST_TTL_SECS),
            toolkit_timeout: Duration::from_millis(DEFAULT_TOOLKIT_TIMEOUT_MS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("hmac_secret", &self.hmac_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer_key", &self.issuer_key.as_ref().map(|_| "[REDACTED]"))
            .field("public_url", &self.public_url)
            .field("offer_ttl", &self.offer_ttl)
            .field("request_ttl", &self.request_ttl)
            .field("toolkit_timeout", &self.toolkit_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// A value in `1..=max`, or `default` when unset.
fn bounded(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
    max: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(default);
    };
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            value,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) if n > max => Err(ConfigError::Invalid {
            var,
            value,
            reason: format!("must be at most {max}"),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn seconds(secs: u64, var: &'static str) -> Result<chrono::Duration, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| ConfigError::Invalid {
            var,
            value: secs.to_string(),
            reason: "out of range".into(),
        })
}
