//! # Canonical Messages
//!
//! Two byte producers whose output is signed, and which therefore must be
//! deterministic:
//!
//! - [`CanonicalQuery`] — the message an offer-token HMAC covers. Built from
//!   an ordered list of named fields, never from the raw query string a
//!   client submitted. Wallets and URL libraries are free to reorder or
//!   re-escape query parameters; the server recomputes the message from the
//!   decoded values in its own fixed order.
//!
//! - [`CanonicalBytes`] — RFC 8785 (JCS) bytes of a JSON document: sorted
//!   keys, compact separators. Used as the signing input for credential and
//!   presentation proofs.
//!
//! ## Security Invariant
//!
//! Both newtypes have private inner fields. The only way to obtain the
//! bytes is through their constructors, so a signature can never be
//! computed over a non-canonical serialization.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Field names of an offer token, in signing order.
pub const OFFER_TOKEN_FIELDS: [&str; 2] = ["id", "expires"];

/// The canonical query message `?k1=v1&k2=v2…` covered by an offer-token HMAC.
///
/// # Invariants
///
/// - Fields appear in the order given, joined with `&`, prefixed with `?`.
/// - Values are used verbatim (decoded, unescaped).
/// - The signature field itself is never part of the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalQuery(String);

impl CanonicalQuery {
    /// Build a message from ordered `(name, value)` pairs.
    pub fn from_fields(fields: &[(&str, &str)]) -> Self {
        let joined = fields
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        Self(format!("?{joined}"))
    }

    /// The message covered by an offer token: `?id=<id>&expires=<expires>`.
    pub fn offer(id: &str, expires: &str) -> Self {
        let [id_field, expires_field] = OFFER_TOKEN_FIELDS;
        Self::from_fields(&[(id_field, id), (expires_field, expires)])
    }

    /// The message as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The message bytes, as fed to the MAC.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bytes produced exclusively by JCS canonicalization (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
