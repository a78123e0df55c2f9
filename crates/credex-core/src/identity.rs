//! # Identity Newtypes
//!
//! - [`Did`] — a W3C Decentralized Identifier, validated at construction.
//! - [`ChallengeId`] — the random nonce that keys a presentation request.
//!   Always valid by construction (UUID v4), collision-resistant under
//!   concurrent creation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// W3C Decentralized Identifier (DID).
///
/// Format: `did:<method>:<method-specific-id>` where method is lowercase
/// alphanumeric and the method-specific id is non-empty.
///
/// Reference: <https://www.w3.org/TR/did-core/#did-syntax>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        match split_did(&s) {
            Some(_) => Ok(Self(s)),
            None => Err(ValidationError::InvalidDid(s)),
        }
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method (between the first and second colons).
    pub fn method(&self) -> &str {
        split_did(&self.0).map(|(m, _)| m).unwrap_or_default()
    }

    /// Everything after `did:method:`.
    pub fn method_specific_id(&self) -> &str {
        split_did(&self.0).map(|(_, id)| id).unwrap_or_default()
    }

    /// The trailing `:`-separated component of the DID.
    ///
    /// For `did:key:z6Mk…` this is `z6Mk…`, the key's own fragment.
    pub fn fragment(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or_default()
    }

    /// The DID URL `<did>#<fragment>` naming the DID's own key.
    pub fn verification_method(&self) -> String {
        format!("{}#{}", self.0, self.fragment())
    }
}

fn split_did(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("did:")?;
    let (method, identifier) = rest.split_once(':')?;
    let method_ok = !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    (method_ok && !identifier.is_empty()).then_some((method, identifier))
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Did {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

/// The challenge nonce of a presentation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(String);

impl ChallengeId {
    /// Generate a fresh random challenge.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a challenge string received from a client.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the challenge string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChallengeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_did_key() {
        let did = Did::new("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK").unwrap();
        assert_eq!(did.method(), "key");
        assert_eq!(
            did.method_specific_id(),
            "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
        );
    }

    #[test]
    fn verification_method_appends_trailing_component() {
        let did = Did::new("did:key:z6Mkabc").unwrap();
        assert_eq!(did.verification_method(), "did:key:z6Mkabc#z6Mkabc");

        let web = Did::new("did:web:example.com:issuer").unwrap();
        assert_eq!(web.fragment(), "issuer");
        assert_eq!(
            web.verification_method(),
            "did:web:example.com:issuer#issuer"
        );
    }

    #[test]
    fn invalid_dids_rejected() {
        for bad in ["", "did:", "did:key", "did::abc", "did:KEY:abc", "key:abc"] {
            assert!(Did::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn did_serde_validates() {
        let ok: Did = serde_json::from_str("\"did:key:abc\"").unwrap();
        assert_eq!(ok.as_str(), "did:key:abc");
        assert!(serde_json::from_str::<Did>("\"not-a-did\"").is_err());
    }

    #[test]
    fn challenges_are_unique() {
        let a = ChallengeId::new();
        let b = ChallengeId::new();
        assert_ne!(a, b);
    }
}
