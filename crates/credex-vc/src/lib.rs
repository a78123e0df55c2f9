//! # credex-vc — Verifiable Credential Records and the DID/VC Toolkit
//!
//! Typed records exchanged with wallets, serialized to and from JSON only at
//! the boundary:
//!
//! - **Credential offers** ([`CredentialOffer`], [`CredentialPreview`]) —
//!   the unsigned credential a wallet is offered before it binds a subject.
//! - **Presentation requests** ([`PresentationRequest`]) — the
//!   query-by-example challenge a verifier hands a holder.
//! - **Proof and verify options** ([`ProofOptions`], [`VerifyOptions`]) and
//!   the toolkit's [`VerificationResult`].
//!
//! All cryptographic DID operations sit behind the [`DidToolkit`] trait.
//! [`LocalToolkit`] implements it with Ed25519 `did:key` identifiers and is
//! what the test suites run against.

pub mod credential;
pub mod local;
pub mod presentation;
pub mod proof;
pub mod toolkit;

pub use credential::{CredentialOffer, CredentialPreview, CredentialSubject};
pub use local::LocalToolkit;
pub use presentation::{CredentialExample, CredentialQuery, PresentationQuery, PresentationRequest};
pub use proof::{ProofOptions, ProofPurpose, VerificationResult, VerifyOptions};
pub use toolkit::{Curve, DidToolkit, Jwk, KeyType, ToolkitError};

/// The W3C credentials v1 JSON-LD context.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The schema.org JSON-LD context carried by offered credentials.
pub const SCHEMA_ORG_CONTEXT: &str = "https://schema.org/";
