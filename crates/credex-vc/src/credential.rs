//! # Credential Offers
//!
//! The unsigned credential (preview) a wallet is offered, and the offer
//! envelope the issuer keeps until a subject is bound and the credential is
//! signed.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use credex_core::{Did, Timestamp, ValidationError};

use crate::{CREDENTIALS_V1_CONTEXT, SCHEMA_ORG_CONTEXT};

/// The `type` of an offer envelope.
pub const CREDENTIAL_OFFER_TYPE: &str = "CredentialOffer";

/// The `type` of an offered credential.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// The subject of an offered credential. Empty until a wallet binds itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSubject {
    /// The holder DID the credential is issued to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
}

/// An unsigned W3C credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPreview {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Credential identifier, the DID minted for this offer.
    pub id: String,
    /// Credential type.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Issuer DID.
    pub issuer: String,
    /// When the credential is issued.
    pub issuance_date: Timestamp,
    /// When the credential stops being valid.
    pub expiration_date: Timestamp,
    /// Credential subject.
    pub credential_subject: CredentialSubject,
}

/// A pending credential offer.
///
/// Keyed in the offer store by the preview's `id`. The only mutation after
/// creation is [`CredentialOffer::bind_subject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOffer {
    /// Always `CredentialOffer`.
    #[serde(rename = "type")]
    pub offer_type: String,
    /// The unsigned credential.
    pub credential_preview: CredentialPreview,
    /// The offer token's `expires`, as supplied at redemption.
    pub expires: String,
}

impl CredentialOffer {
    /// Build an offer whose credential is valid from `now` for `validity`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TimestampOverflow`] if `now + validity`
    /// is out of range.
    pub fn new(
        id: impl Into<String>,
        issuer: &Did,
        now: Timestamp,
        validity: Duration,
        expires: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let expiration_date = now.plus(validity)?;
        Ok(Self {
            offer_type: CREDENTIAL_OFFER_TYPE.to_string(),
            credential_preview: CredentialPreview {
                context: vec![
                    CREDENTIALS_V1_CONTEXT.to_string(),
                    SCHEMA_ORG_CONTEXT.to_string(),
                ],
                id: id.into(),
                credential_type: VERIFIABLE_CREDENTIAL_TYPE.to_string(),
                issuer: issuer.as_str().to_string(),
                issuance_date: now,
                expiration_date,
                credential_subject: CredentialSubject::default(),
            },
            expires: expires.into(),
        })
    }

    /// The offer id (the preview's `id`).
    pub fn id(&self) -> &str {
        &self.credential_preview.id
    }

    /// The issuer DID string.
    pub fn issuer(&self) -> &str {
        &self.credential_preview.issuer
    }

    /// Bind the wallet's DID as the credential subject.
    pub fn bind_subject(&mut self, subject_id: impl Into<String>) {
        self.credential_preview.credential_subject = CredentialSubject {
            id: Some(subject_id.into()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn offer() -> CredentialOffer {
        let now = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let issuer = Did::new("did:key:issuer").unwrap();
        CredentialOffer::new(
            "did:key:subject",
            &issuer,
            now,
            Duration::minutes(15),
            "2024-01-01T00:15:00Z",
        )
        .unwrap()
    }

    #[test]
    fn offer_json_shape() {
        let json = serde_json::to_value(offer()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "CredentialOffer",
                "credentialPreview": {
                    "@context": [
                        "https://www.w3.org/2018/credentials/v1",
                        "https://schema.org/"
                    ],
                    "id": "did:key:subject",
                    "type": "VerifiableCredential",
                    "issuer": "did:key:issuer",
                    "issuanceDate": "2024-01-01T00:00:00Z",
                    "expirationDate": "2024-01-01T00:15:00Z",
                    "credentialSubject": {}
                },
                "expires": "2024-01-01T00:15:00Z"
            })
        );
    }

    #[test]
    fn bind_subject_sets_id() {
        let mut o = offer();
        o.bind_subject("did:key:holder");
        let json = serde_json::to_value(&o.credential_preview).unwrap();
        assert_eq!(json["credentialSubject"], serde_json::json!({"id": "did:key:holder"}));
        assert_eq!(o.id(), "did:key:subject");
        assert_eq!(o.issuer(), "did:key:issuer");
    }
}
