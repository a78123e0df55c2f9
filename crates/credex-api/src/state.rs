//! # Application State
//!
//! Shared state for the Axum application: the offer and exchange services
//! and the stores behind them. Clone-friendly; every clone shares the same
//! stores through `Arc`.

use std::sync::Arc;

use credex_crypto::HmacSecret;
use credex_protocol::{
    ExchangeService, ExchangeStore, OfferService, OfferStore, ProtocolConfig, ToolkitRunner,
};
use credex_state::MemoryRegistry;
use credex_vc::{DidToolkit, Jwk, ToolkitError};

use crate::config::AppConfig;

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Offer minting, redemption, and issuance.
    pub offers: OfferService,
    /// Presentation requests and verification.
    pub exchange: ExchangeService,
    /// Pending offers, shared with the eviction sweeper.
    pub offer_store: OfferStore,
    /// Pending presentation requests, shared with the eviction sweeper.
    pub request_store: ExchangeStore,
    /// Fixed base URL for minted URLs. `None` derives it from `Host`.
    pub public_url: Option<String>,
}

impl AppState {
    /// Build state over fresh in-memory stores.
    pub fn new(
        config: ProtocolConfig,
        toolkit: Arc<dyn DidToolkit>,
        public_url: Option<String>,
    ) -> Self {
        let runner = ToolkitRunner::new(toolkit, config.toolkit_timeout);
        let config = Arc::new(config);
        let offer_store: OfferStore = Arc::new(MemoryRegistry::new());
        let request_store: ExchangeStore = Arc::new(MemoryRegistry::new());
        Self {
            offers: OfferService::new(config.clone(), offer_store.clone(), runner.clone()),
            exchange: ExchangeService::new(config, request_store.clone(), runner),
            offer_store,
            request_store,
            public_url,
        }
    }

    /// Build state from the loaded server configuration, generating an
    /// ephemeral HMAC secret and issuer key when none is configured.
    pub fn from_config(
        config: &AppConfig,
        toolkit: Arc<dyn DidToolkit>,
    ) -> Result<Self, ToolkitError> {
        let hmac_secret = match &config.hmac_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "HMAC_SECRET not set, generating ephemeral secret. \
                     Offer tokens minted now will not redeem after restart."
                );
                HmacSecret::generate()
            }
        };
        let issuer_key: Jwk = match &config.issuer_key {
            Some(key) => key.clone(),
            None => {
                tracing::warn!(
                    "ISSUER_KEY not set, generating ephemeral key. \
                     Credentials signed with this key name an issuer that is gone after restart."
                );
                toolkit.generate_key()?
            }
        };

        let mut protocol = ProtocolConfig::new(hmac_secret, issuer_key);
        protocol.offer_ttl = config.offer_ttl;
        protocol.request_ttl = config.request_ttl;
        protocol.toolkit_timeout = config.toolkit_timeout;

        Ok(Self::new(protocol, toolkit, config.public_url.clone()))
    }
}
