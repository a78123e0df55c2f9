//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `credex-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Key material is malformed (wrong length, invalid point, empty secret).
    #[error("invalid key: {0}")]
    KeyError(String),
}
