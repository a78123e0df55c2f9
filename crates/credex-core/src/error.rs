//! # Error Hierarchy
//!
//! Structured error types for credex, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`ExchangeError`] is what a wallet sees when an offer redemption,
//! issuance, or presentation is rejected. The HTTP layer maps each variant
//! one-to-one onto a status code.

use thiserror::Error;

/// Rejections produced by the offer and exchange protocols.
///
/// All variants are client-facing. None of them is retried internally and
/// none of them leaves shared store state modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// A required request field was absent or empty.
    #[error("the field '{0}' is required")]
    MissingField(&'static str),

    /// The offer token could not be parsed (e.g. unparsable `expires`).
    #[error("malformed offer token: {0}")]
    MalformedToken(String),

    /// The offer token's `expires` lies strictly before the current time.
    #[error("the offer expired at {expires}")]
    Expired {
        /// The `expires` value as supplied by the client.
        expires: String,
    },

    /// The recomputed HMAC does not match the supplied one.
    #[error("invalid HMAC")]
    InvalidSignature,

    /// No pending offer is registered under this id.
    #[error("no pending offer for id \"{0}\"")]
    UnknownOffer(String),

    /// The toolkit refused to sign the credential.
    #[error("credential issuance failed: {0}")]
    IssuanceFailed(String),

    /// The toolkit reported errors verifying the presentation proof.
    #[error("can't verify presentation: [{}]", .0.join(", "))]
    PresentationVerificationFailed(Vec<String>),

    /// The toolkit reported errors verifying the embedded credential.
    #[error("can't verify credential: [{}]", .0.join(", "))]
    CredentialVerificationFailed(Vec<String>),

    /// The presentation carries no `verifiableCredential`.
    #[error("unable to find credential")]
    MissingCredential,

    /// The submitted presentation is not a JSON object.
    #[error("malformed presentation: {0}")]
    MalformedPresentation(String),

    /// The presentation holder is not the credential subject.
    #[error("credential subject {subject:?} does not match holder {holder:?}")]
    SubjectHolderMismatch {
        /// `holder` of the presentation, if present.
        holder: Option<String>,
        /// `credentialSubject.id` of the credential, if present.
        subject: Option<String>,
    },

    /// A toolkit call exceeded its time bound.
    #[error("toolkit operation '{operation}' timed out")]
    ToolkitTimeout {
        /// The toolkit operation that was abandoned.
        operation: &'static str,
    },

    /// A toolkit call outside issuance/verification failed (key generation,
    /// DID derivation).
    #[error("toolkit operation '{operation}' failed: {detail}")]
    Toolkit {
        /// The toolkit operation that failed.
        operation: &'static str,
        /// Toolkit-defined error detail, passed through verbatim.
        detail: String,
    },

    /// A failure of the service itself rather than of the request: a
    /// crashed blocking task, or one of its own records failing to
    /// serialize.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// DID does not conform to W3C DID syntax (did:method:identifier).
    #[error("invalid DID format: \"{0}\" (expected did:<method>:<identifier>)")]
    InvalidDid(String),

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp shifted past the representable range.
    #[error("timestamp {value} plus {seconds}s is out of range")]
    TimestampOverflow {
        /// The starting timestamp.
        value: String,
        /// The shift, in seconds.
        seconds: i64,
    },
}
