//! # Offer-Token Codec
//!
//! HMAC-SHA256 signing and verification of offer-token messages.
//!
//! ## Security Invariants
//!
//! - The signed input is a [`CanonicalQuery`], never raw request bytes.
//! - Verification compares the supplied and recomputed hex signatures in
//!   constant time. A length mismatch still performs a dummy comparison.
//! - The secret is zeroized on drop and redacted from `Debug`.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use credex_core::CanonicalQuery;

use crate::error::CryptoError;
use crate::hex::to_hex;

type HmacSha256 = Hmac<Sha256>;

/// Length of a freshly generated secret, in bytes.
pub const GENERATED_SECRET_LEN: usize = 32;

/// The server-side secret that offer-token signatures are keyed with.
#[derive(Clone)]
pub struct HmacSecret(Zeroizing<Vec<u8>>);

impl HmacSecret {
    /// Wrap configured secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyError`] for an empty secret.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::KeyError("HMAC secret must not be empty".into()));
        }
        Ok(Self(Zeroizing::new(bytes)))
    }

    /// Generate a random secret from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_SECRET_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for HmacSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HmacSecret([REDACTED])")
    }
}

/// A lowercase hex HMAC-SHA256 signature over an offer-token message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenSignature(String);

impl TokenSignature {
    /// The hex string as carried in the `hmac` query parameter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sign a canonical query with the server secret.
///
/// # Errors
///
/// Returns [`CryptoError::KeyError`] if the MAC cannot be keyed.
pub fn sign(message: &CanonicalQuery, secret: &HmacSecret) -> Result<TokenSignature, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CryptoError::KeyError(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(TokenSignature(to_hex(&mac.finalize().into_bytes())))
}

/// Check a client-supplied hex signature against the recomputed one.
///
/// The comparison is over the hex strings exactly as supplied, so an
/// upper-cased signature does not verify.
pub fn verify(message: &CanonicalQuery, supplied: &str, secret: &HmacSecret) -> bool {
    match sign(message, secret) {
        Ok(expected) => constant_time_eq(supplied.as_bytes(), expected.as_str().as_bytes()),
        Err(_) => false,
    }
}

fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}
