//! # credex-crypto — Cryptographic Primitives for credex
//!
//! - **Offer-token codec** ([`token`]): HMAC-SHA256 over a
//!   [`CanonicalQuery`](credex_core::CanonicalQuery), hex-encoded, with
//!   constant-time verification.
//! - **Ed25519** signing and verification over
//!   [`CanonicalBytes`](credex_core::CanonicalBytes), used by the local
//!   DID toolkit for credential and presentation proofs.
//!
//! Everything here is a pure function of its inputs: no caching, no I/O.

pub mod ed25519;
pub mod error;
pub mod hex;
pub mod token;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use token::{HmacSecret, TokenSignature};
