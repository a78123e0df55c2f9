//! # DID/VC Toolkit Interface
//!
//! Every cryptographic DID operation the exchange needs (key generation,
//! DID derivation, proof creation and verification, DID resolution) goes
//! through [`DidToolkit`]. The trait is synchronous; callers on an async
//! runtime run it on the blocking pool.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use credex_core::Did;

use crate::proof::{ProofOptions, VerificationResult, VerifyOptions};

/// JWK key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    /// Octet key pair (Edwards curve).
    #[serde(rename = "OKP")]
    Okp,
}

/// JWK curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Curve {
    /// Ed25519 signature curve.
    Ed25519,
}

/// A JSON Web Key as exchanged with the toolkit.
///
/// `x` is the base64url public key. `d`, when present, is the private seed;
/// it is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type.
    pub kty: KeyType,
    /// Curve.
    pub crv: Curve,
    /// Public key.
    pub x: String,
    /// Private key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub d: Option<String>,
}

impl Jwk {
    /// Parse a JWK from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::InvalidKey`] if the text is not a supported JWK.
    pub fn from_json(text: &str) -> Result<Self, ToolkitError> {
        serde_json::from_str(text).map_err(|e| ToolkitError::InvalidKey(e.to_string()))
    }

    /// Whether the key carries private material.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// The public half of this key.
    pub fn public(&self) -> Self {
        Self {
            d: None,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Jwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Failures reported by a toolkit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolkitError {
    /// The key is malformed or lacks required material.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The DID method is not supported.
    #[error("unsupported DID method: {0}")]
    UnsupportedMethod(String),

    /// The DID or DID URL could not be parsed.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// A document could not be signed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A document was not a JSON object, or could not be canonicalized.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A DID URL did not dereference to anything.
    #[error("not found: {0}")]
    NotFound(String),
}

/// The DID/VC operations the exchange delegates.
///
/// Verification methods return `Ok` with a populated
/// [`VerificationResult::errors`] for documents that fail verification;
/// `Err` is reserved for the toolkit being unable to run at all.
pub trait DidToolkit: Send + Sync {
    /// Generate a fresh private key.
    fn generate_key(&self) -> Result<Jwk, ToolkitError>;

    /// Derive the DID for `key` under `method`.
    fn key_to_did(&self, method: &str, key: &Jwk) -> Result<Did, ToolkitError>;

    /// Derive the verification method DID URL for `key` under `method`.
    fn key_to_verification_method(&self, method: &str, key: &Jwk) -> Result<String, ToolkitError>;

    /// Attach a proof to `credential` signed with `key`.
    fn issue_credential(
        &self,
        credential: &Value,
        options: &ProofOptions,
        key: &Jwk,
    ) -> Result<Value, ToolkitError>;

    /// Verify a signed credential.
    fn verify_credential(
        &self,
        credential: &Value,
        options: &VerifyOptions,
    ) -> Result<VerificationResult, ToolkitError>;

    /// Attach a proof to `presentation` signed with `key`.
    fn issue_presentation(
        &self,
        presentation: &Value,
        options: &ProofOptions,
        key: &Jwk,
    ) -> Result<Value, ToolkitError>;

    /// Verify a signed presentation.
    fn verify_presentation(
        &self,
        presentation: &Value,
        options: &VerifyOptions,
    ) -> Result<VerificationResult, ToolkitError>;

    /// Resolve a DID to its DID document.
    fn resolve_did(&self, did: &str) -> Result<Value, ToolkitError>;

    /// Dereference a DID URL to the resource it names.
    fn dereference_did_url(&self, did_url: &str) -> Result<Value, ToolkitError>;

    /// Produce an empty presentation by `holder` proving control of `key`.
    fn did_auth(&self, holder: &Did, options: &ProofOptions, key: &Jwk)
        -> Result<Value, ToolkitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwk_json_shape() {
        let jwk = Jwk::from_json(r#"{"kty":"OKP","crv":"Ed25519","x":"abc","d":"def"}"#).unwrap();
        assert!(jwk.is_private());
        let public = serde_json::to_value(jwk.public()).unwrap();
        assert_eq!(public, serde_json::json!({"kty": "OKP", "crv": "Ed25519", "x": "abc"}));
    }

    #[test]
    fn jwk_rejects_unsupported_curve() {
        let err = Jwk::from_json(r#"{"kty":"EC","crv":"P-256","x":"abc"}"#).unwrap_err();
        assert!(matches!(err, ToolkitError::InvalidKey(_)));
    }

    #[test]
    fn jwk_debug_redacts_private_key() {
        let jwk = Jwk::from_json(r#"{"kty":"OKP","crv":"Ed25519","x":"abc","d":"secret-seed"}"#)
            .unwrap();
        let debug = format!("{jwk:?}");
        assert!(!debug.contains("secret-seed"));
        assert!(debug.contains("[REDACTED]"));
    }
}
