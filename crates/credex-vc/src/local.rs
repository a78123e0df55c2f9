//! # Local Ed25519 Toolkit
//!
//! An in-process [`DidToolkit`] over Ed25519 `did:key` identifiers.
//!
//! - DIDs are `did:key:z<base58btc(0xed 0x01 || public key)>`; the
//!   verification method is the DID followed by `#` and its own
//!   method-specific id.
//! - Proofs are `Ed25519Signature2020` over the JCS canonical form of
//!   `{"document": <document without proof>, "proof": <proof without proofValue>}`.
//! - With a fixed clock and a seeded key, issued documents are byte-for-byte
//!   reproducible.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::{json, Map, Value};
use zeroize::Zeroizing;

use credex_core::{CanonicalBytes, Did, Timestamp};
use credex_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::proof::{ProofOptions, ProofPurpose, VerificationResult, VerifyOptions};
use crate::toolkit::{Curve, DidToolkit, Jwk, KeyType, ToolkitError};
use crate::CREDENTIALS_V1_CONTEXT;

/// The only DID method this toolkit derives and resolves.
pub const DID_KEY_METHOD: &str = "key";

/// Proof suite attached to issued documents.
pub const PROOF_TYPE: &str = "Ed25519Signature2020";

const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];
const MULTIBASE_BASE58BTC: char = 'z';
const MULTIBASE_BASE64URL: char = 'u';
const DID_V1_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
const VERIFICATION_KEY_TYPE: &str = "Ed25519VerificationKey2020";
const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// In-process Ed25519 `did:key` toolkit.
#[derive(Debug, Clone, Default)]
pub struct LocalToolkit {
    fixed_now: Option<Timestamp>,
}

impl LocalToolkit {
    /// A toolkit that reads the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// A toolkit whose clock is pinned to `now`, for proof `created` stamps
    /// and credential expiry checks.
    pub fn with_clock(now: Timestamp) -> Self {
        Self {
            fixed_now: Some(now),
        }
    }

    /// A private key derived from a fixed seed.
    pub fn key_from_seed(seed: &[u8; 32]) -> Jwk {
        jwk_from_key_pair(&Ed25519KeyPair::from_seed(seed))
    }

    fn now(&self) -> Timestamp {
        self.fixed_now.unwrap_or_else(Timestamp::now)
    }

    fn sign_document(
        &self,
        document: &Value,
        options: &ProofOptions,
        key: &Jwk,
    ) -> Result<Value, ToolkitError> {
        let mut doc = document
            .as_object()
            .cloned()
            .ok_or_else(|| ToolkitError::MalformedDocument("expected a JSON object".into()))?;
        let key_pair = key_pair_from_jwk(key)?;
        let signer = did_for_public_key(&key_pair.public_key())?;
        let (vm_did, _) = split_did_url(&options.verification_method);
        if vm_did != signer.as_str() {
            return Err(ToolkitError::Signing(format!(
                "verification method {} is not controlled by the signing key",
                options.verification_method
            )));
        }

        let mut proof = Map::new();
        proof.insert("type".into(), json!(PROOF_TYPE));
        proof.insert("created".into(), json!(self.now()));
        proof.insert(
            "verificationMethod".into(),
            json!(options.verification_method),
        );
        proof.insert("proofPurpose".into(), json!(options.proof_purpose));
        if let Some(challenge) = &options.challenge {
            proof.insert("challenge".into(), json!(challenge));
        }
        if let Some(domain) = &options.domain {
            proof.insert("domain".into(), json!(domain));
        }

        let input = signing_input(&doc, &proof)?;
        let signature = key_pair.sign(&input);
        proof.insert(
            "proofValue".into(),
            json!(format!(
                "{MULTIBASE_BASE64URL}{}",
                Base64UrlUnpadded::encode_string(signature.as_bytes())
            )),
        );
        doc.insert("proof".into(), Value::Object(proof));
        Ok(Value::Object(doc))
    }
}

impl DidToolkit for LocalToolkit {
    fn generate_key(&self) -> Result<Jwk, ToolkitError> {
        Ok(jwk_from_key_pair(&Ed25519KeyPair::generate()))
    }

    fn key_to_did(&self, method: &str, key: &Jwk) -> Result<Did, ToolkitError> {
        if method != DID_KEY_METHOD {
            return Err(ToolkitError::UnsupportedMethod(method.to_string()));
        }
        did_for_public_key(&public_key_from_jwk(key)?)
    }

    fn key_to_verification_method(&self, method: &str, key: &Jwk) -> Result<String, ToolkitError> {
        Ok(self.key_to_did(method, key)?.verification_method())
    }

    fn issue_credential(
        &self,
        credential: &Value,
        options: &ProofOptions,
        key: &Jwk,
    ) -> Result<Value, ToolkitError> {
        self.sign_document(credential, options, key)
    }

    /// Checks an `assertionMethod` proof by the credential's issuer, and the
    /// credential's `expirationDate`. Challenge and domain in `options` bind
    /// the enclosing presentation, not the credential, and are not consulted.
    fn verify_credential(
        &self,
        credential: &Value,
        _options: &VerifyOptions,
    ) -> Result<VerificationResult, ToolkitError> {
        let mut result = VerificationResult {
            checks: vec!["proof".into()],
            ..Default::default()
        };
        match check_proof(credential, ProofPurpose::AssertionMethod) {
            Err(e) => result.errors.push(e),
            Ok((signer, _)) => {
                let issuer = credential.get("issuer").and_then(Value::as_str);
                if issuer != Some(signer.as_str()) {
                    result
                        .errors
                        .push(format!("issuer is not the signer {signer}"));
                }
            }
        }
        if let Some(expiration) = credential.get("expirationDate").and_then(Value::as_str) {
            result.checks.push("expiration".into());
            match Timestamp::parse(expiration) {
                Ok(t) if t.is_passed_at(self.now().as_datetime()) => {
                    result.errors.push("credential has expired".into());
                }
                Ok(_) => {}
                Err(e) => result.errors.push(e.to_string()),
            }
        }
        Ok(result)
    }

    fn issue_presentation(
        &self,
        presentation: &Value,
        options: &ProofOptions,
        key: &Jwk,
    ) -> Result<Value, ToolkitError> {
        self.sign_document(presentation, options, key)
    }

    /// Checks the proof purpose and domain against `options`, the proof
    /// challenge against the embedded request, and that a stated `holder`
    /// is the signer. A request-less `options` never verifies.
    fn verify_presentation(
        &self,
        presentation: &Value,
        options: &VerifyOptions,
    ) -> Result<VerificationResult, ToolkitError> {
        let mut result = VerificationResult {
            checks: vec!["proof".into()],
            ..Default::default()
        };
        match check_proof(presentation, options.proof_purpose) {
            Err(e) => result.errors.push(e),
            Ok((signer, proof)) => {
                if proof.get("domain").and_then(Value::as_str) != Some(options.domain.as_str()) {
                    result
                        .errors
                        .push(format!("domain mismatch: expected {}", options.domain));
                }
                match options.expected_challenge() {
                    Some(expected) => {
                        if proof.get("challenge").and_then(Value::as_str) != Some(expected) {
                            result.errors.push("challenge mismatch".into());
                        }
                    }
                    None => result.errors.push("challenge not recognised".into()),
                }
                if let Some(holder) = presentation.get("holder").and_then(Value::as_str) {
                    if holder != signer.as_str() {
                        result
                            .errors
                            .push(format!("holder {holder} is not the signer {signer}"));
                    }
                }
            }
        }
        Ok(result)
    }

    fn resolve_did(&self, did: &str) -> Result<Value, ToolkitError> {
        let did = Did::new(did).map_err(|e| ToolkitError::InvalidDid(e.to_string()))?;
        let public_key = public_key_for_did(did.as_str())?;
        let vm = did.verification_method();
        let jwk = Jwk {
            kty: KeyType::Okp,
            crv: Curve::Ed25519,
            x: Base64UrlUnpadded::encode_string(public_key.as_bytes()),
            d: None,
        };
        Ok(json!({
            "@context": [DID_V1_CONTEXT],
            "id": did,
            "verificationMethod": [{
                "id": vm,
                "type": VERIFICATION_KEY_TYPE,
                "controller": did,
                "publicKeyJwk": jwk,
            }],
            "authentication": [vm],
            "assertionMethod": [vm],
        }))
    }

    fn dereference_did_url(&self, did_url: &str) -> Result<Value, ToolkitError> {
        let (did, fragment) = split_did_url(did_url);
        let document = self.resolve_did(did)?;
        if fragment.is_none() {
            return Ok(document);
        }
        document["verificationMethod"]
            .as_array()
            .and_then(|methods| methods.iter().find(|m| m["id"] == did_url))
            .cloned()
            .ok_or_else(|| ToolkitError::NotFound(did_url.to_string()))
    }

    fn did_auth(
        &self,
        holder: &Did,
        options: &ProofOptions,
        key: &Jwk,
    ) -> Result<Value, ToolkitError> {
        let presentation = json!({
            "@context": [CREDENTIALS_V1_CONTEXT],
            "type": [VERIFIABLE_PRESENTATION_TYPE],
            "holder": holder,
        });
        self.issue_presentation(&presentation, options, key)
    }
}

fn jwk_from_key_pair(key_pair: &Ed25519KeyPair) -> Jwk {
    let seed = key_pair.seed();
    Jwk {
        kty: KeyType::Okp,
        crv: Curve::Ed25519,
        x: Base64UrlUnpadded::encode_string(key_pair.public_key().as_bytes()),
        d: Some(Base64UrlUnpadded::encode_string(seed.as_slice())),
    }
}

fn public_key_from_jwk(key: &Jwk) -> Result<Ed25519PublicKey, ToolkitError> {
    let bytes = Base64UrlUnpadded::decode_vec(&key.x)
        .map_err(|e| ToolkitError::InvalidKey(format!("x: {e}")))?;
    Ed25519PublicKey::from_slice(&bytes).map_err(|e| ToolkitError::InvalidKey(e.to_string()))
}

fn key_pair_from_jwk(key: &Jwk) -> Result<Ed25519KeyPair, ToolkitError> {
    let d = key
        .d
        .as_deref()
        .ok_or_else(|| ToolkitError::InvalidKey("missing private key".into()))?;
    let seed = Zeroizing::new(
        Base64UrlUnpadded::decode_vec(d).map_err(|e| ToolkitError::InvalidKey(format!("d: {e}")))?,
    );
    let key_pair = Ed25519KeyPair::from_seed_slice(&seed)
        .map_err(|e| ToolkitError::InvalidKey(e.to_string()))?;
    if key_pair.public_key() != public_key_from_jwk(key)? {
        return Err(ToolkitError::InvalidKey(
            "public key does not match private key".into(),
        ));
    }
    Ok(key_pair)
}

fn did_for_public_key(public_key: &Ed25519PublicKey) -> Result<Did, ToolkitError> {
    let mut bytes = ED25519_MULTICODEC.to_vec();
    bytes.extend_from_slice(public_key.as_bytes());
    Did::new(format!(
        "did:{DID_KEY_METHOD}:{MULTIBASE_BASE58BTC}{}",
        bs58::encode(&bytes).into_string()
    ))
    .map_err(|e| ToolkitError::InvalidDid(e.to_string()))
}

fn public_key_for_did(did: &str) -> Result<Ed25519PublicKey, ToolkitError> {
    let did = Did::new(did).map_err(|e| ToolkitError::InvalidDid(e.to_string()))?;
    if did.method() != DID_KEY_METHOD {
        return Err(ToolkitError::UnsupportedMethod(did.method().to_string()));
    }
    let encoded = did
        .method_specific_id()
        .strip_prefix(MULTIBASE_BASE58BTC)
        .ok_or_else(|| ToolkitError::InvalidDid(format!("{did}: unsupported multibase")))?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| ToolkitError::InvalidDid(format!("{did}: {e}")))?;
    let raw = bytes
        .strip_prefix(&ED25519_MULTICODEC[..])
        .ok_or_else(|| ToolkitError::InvalidDid(format!("{did}: not an Ed25519 key")))?;
    Ed25519PublicKey::from_slice(raw).map_err(|e| ToolkitError::InvalidDid(e.to_string()))
}

fn split_did_url(did_url: &str) -> (&str, Option<&str>) {
    match did_url.split_once('#') {
        Some((did, fragment)) => (did, Some(fragment)),
        None => (did_url, None),
    }
}

fn signing_input(
    document: &Map<String, Value>,
    proof: &Map<String, Value>,
) -> Result<CanonicalBytes, ToolkitError> {
    let mut unsigned_document = document.clone();
    unsigned_document.remove("proof");
    let mut unsigned_proof = proof.clone();
    unsigned_proof.remove("proofValue");
    CanonicalBytes::new(&json!({"document": unsigned_document, "proof": unsigned_proof}))
        .map_err(|e| ToolkitError::MalformedDocument(e.to_string()))
}

/// Verify a document's embedded proof, returning the signer's DID and the
/// proof on success, or the first failure.
fn check_proof(
    document: &Value,
    purpose: ProofPurpose,
) -> Result<(Did, Map<String, Value>), String> {
    let doc = document.as_object().ok_or("document is not a JSON object")?;
    let proof = doc
        .get("proof")
        .and_then(Value::as_object)
        .ok_or("missing proof")?;

    let found = proof
        .get("proofPurpose")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if found != purpose.as_str() {
        return Err(format!(
            "expected proof purpose {}, found {found:?}",
            purpose.as_str()
        ));
    }

    let vm = proof
        .get("verificationMethod")
        .and_then(Value::as_str)
        .ok_or("missing verificationMethod")?;
    let (did, _) = split_did_url(vm);
    let public_key = public_key_for_did(did).map_err(|e| e.to_string())?;

    let signature_bytes = proof
        .get("proofValue")
        .and_then(Value::as_str)
        .and_then(|v| v.strip_prefix(MULTIBASE_BASE64URL))
        .and_then(|v| Base64UrlUnpadded::decode_vec(v).ok())
        .ok_or("proofValue is not multibase base64url")?;
    let signature = Ed25519Signature::from_slice(&signature_bytes).map_err(|e| e.to_string())?;

    let input = signing_input(doc, proof).map_err(|e| e.to_string())?;
    credex_crypto::verify(&input, &signature, &public_key)
        .map_err(|_| "signature error".to_string())?;

    let signer = Did::new(did).map_err(|e| e.to_string())?;
    Ok((signer, proof.clone()))
}
