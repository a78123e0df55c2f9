//! # Presentation Requests
//!
//! A query-by-example request for a credential, bound to a fresh challenge
//! and to the verifier's own domain.

use serde::{Deserialize, Serialize};

use credex_core::ChallengeId;

use crate::credential::VERIFIABLE_CREDENTIAL_TYPE;
use crate::CREDENTIALS_V1_CONTEXT;

/// The `type` of a presentation request.
pub const PRESENTATION_REQUEST_TYPE: &str = "VerifiablePresentationRequest";

/// The query `type` used for all requests.
pub const QUERY_BY_EXAMPLE: &str = "QueryByExample";

/// Reason shown to the holder.
pub const SIGN_IN_REASON: &str = "Sign in";

/// Shape of the credential being requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialExample {
    /// JSON-LD contexts the credential must carry.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Required credential type.
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// What is asked of the holder, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialQuery {
    /// Human-readable reason.
    pub reason: String,
    /// Example of the credential wanted.
    pub example: CredentialExample,
}

/// The query part of a presentation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationQuery {
    /// Always `QueryByExample`.
    #[serde(rename = "type")]
    pub query_type: String,
    /// The credential query.
    pub credential_query: CredentialQuery,
}

/// A pending presentation request, keyed by its challenge.
///
/// Read-only once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationRequest {
    /// Always `VerifiablePresentationRequest`.
    #[serde(rename = "type")]
    pub request_type: String,
    /// The credential query.
    pub query: PresentationQuery,
    /// The nonce the holder must sign over.
    pub challenge: ChallengeId,
    /// The verifier's own origin.
    pub domain: String,
}

impl PresentationRequest {
    /// A sign-in request for any W3C verifiable credential, with a fresh
    /// challenge.
    pub fn sign_in(domain: impl Into<String>) -> Self {
        Self {
            request_type: PRESENTATION_REQUEST_TYPE.to_string(),
            query: PresentationQuery {
                query_type: QUERY_BY_EXAMPLE.to_string(),
                credential_query: CredentialQuery {
                    reason: SIGN_IN_REASON.to_string(),
                    example: CredentialExample {
                        context: vec![CREDENTIALS_V1_CONTEXT.to_string()],
                        credential_type: VERIFIABLE_CREDENTIAL_TYPE.to_string(),
                    },
                },
            },
            challenge: ChallengeId::new(),
            domain: domain.into(),
        }
    }
}
