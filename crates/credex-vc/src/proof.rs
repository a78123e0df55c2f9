//! # Proof and Verify Options
//!
//! Options handed to the toolkit when signing and verifying, and the
//! result it reports back.

use serde::{Deserialize, Serialize};

use credex_core::Did;

use crate::presentation::PresentationRequest;

/// The purpose of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the credential claims.
    AssertionMethod,
    /// Authentication of the holder.
    Authentication,
}

impl ProofPurpose {
    /// The JSON-LD term for this purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssertionMethod => "assertionMethod",
            Self::Authentication => "authentication",
        }
    }
}

/// Options for producing a proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOptions {
    /// Why the proof is made.
    pub proof_purpose: ProofPurpose,
    /// DID URL of the signing key.
    pub verification_method: String,
    /// Challenge to sign over (presentations).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub challenge: Option<String>,
    /// Domain to sign over (presentations).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub domain: Option<String>,
}

impl ProofOptions {
    /// Assertion by `issuer` with its own key: the verification method is
    /// `<issuer>#<trailing component of issuer>`.
    pub fn assertion(issuer: &Did) -> Self {
        Self {
            proof_purpose: ProofPurpose::AssertionMethod,
            verification_method: issuer.verification_method(),
            challenge: None,
            domain: None,
        }
    }

    /// Authentication by `holder` over a verifier's challenge and domain.
    pub fn authentication(holder: &Did, challenge: &str, domain: &str) -> Self {
        Self {
            proof_purpose: ProofPurpose::Authentication,
            verification_method: holder.verification_method(),
            challenge: Some(challenge.to_string()),
            domain: Some(domain.to_string()),
        }
    }
}

/// Options for verifying a presentation and its credential.
///
/// `challenge` embeds the whole stored [`PresentationRequest`], not only its
/// challenge string. An unknown challenge serializes as `null`, leaving the
/// toolkit to decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOptions {
    /// The stored request the presentation answers, if any.
    pub challenge: Option<PresentationRequest>,
    /// The verifier's domain.
    pub domain: String,
    /// Expected proof purpose.
    pub proof_purpose: ProofPurpose,
}

impl VerifyOptions {
    /// Options for authenticating a holder against a stored request.
    pub fn authentication(request: Option<PresentationRequest>, domain: impl Into<String>) -> Self {
        Self {
            challenge: request,
            domain: domain.into(),
            proof_purpose: ProofPurpose::Authentication,
        }
    }

    /// The expected challenge string, when a request was found.
    pub fn expected_challenge(&self) -> Option<&str> {
        self.challenge.as_ref().map(|r| r.challenge.as_str())
    }
}

/// What the toolkit reports after verifying a proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Checks that were performed.
    #[serde(default)]
    pub checks: Vec<String>,
    /// Non-fatal findings.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Fatal findings. Empty means verified.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl VerificationResult {
    /// Whether no errors were reported.
    pub fn is_verified(&self) -> bool {
        self.errors.is_empty()
    }
}
