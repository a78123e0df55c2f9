//! # credex-protocol — Offer and Exchange Protocols
//!
//! - [`OfferService`] mints HMAC-bound offer tokens, redeems them into
//!   pending [`CredentialOffer`](credex_vc::CredentialOffer)s, binds the
//!   wallet's DID as subject, and has the toolkit sign the credential.
//! - [`ExchangeService`] issues challenge-bound presentation requests and
//!   verifies the presentations answering them.
//!
//! Both take a [`ProtocolConfig`] built once at startup, their registry,
//! and a [`ToolkitRunner`] that moves every toolkit call onto the blocking
//! pool under a time bound.

pub mod config;
pub mod exchange;
pub mod offer;
pub mod runner;
pub mod sweeper;

use std::sync::Arc;

use credex_state::Registry;
use credex_vc::{CredentialOffer, PresentationRequest};

pub use config::ProtocolConfig;
pub use exchange::ExchangeService;
pub use offer::{OfferService, OfferToken};
pub use runner::ToolkitRunner;
pub use sweeper::{spawn_sweeper, sweep_once, SweepReport};

/// Pending credential offers, keyed by offer id.
pub type OfferStore = Arc<dyn Registry<CredentialOffer>>;

/// Pending presentation requests, keyed by challenge.
pub type ExchangeStore = Arc<dyn Registry<PresentationRequest>>;
