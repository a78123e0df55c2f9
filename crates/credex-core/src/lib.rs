#![deny(missing_docs)]

//! # credex-core — Foundational Types for credex
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `serde_json`,
//! `serde_jcs`, `thiserror`, `chrono`, and `uuid` from the ecosystem.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalQuery`] is the sole path to an offer-token message.** The
//!    HMAC over an offer token is computed from an ordered field list, never
//!    from the raw query string a client sent.
//!
//! 2. **[`CanonicalBytes`] is the sole path to a proof signing input.** JSON
//!    documents are signed over their RFC 8785 form.
//!
//! 3. **[`Timestamp`] is UTC with second precision.** Offer expiry and
//!    credential validity windows are compared on whole seconds.
//!
//! 4. **[`ExchangeError`] is the client-facing taxonomy.** Every rejection
//!    a wallet can observe is one of its variants.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::{CanonicalBytes, CanonicalQuery};
pub use error::{CanonicalizationError, ExchangeError, ValidationError};
pub use identity::{ChallengeId, Did};
pub use temporal::Timestamp;
