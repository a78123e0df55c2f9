//! # Offer Service
//!
//! Offer lifecycle: `Unredeemed` (a self-contained token in a URL, nothing
//! stored) → `Redeemed` (a [`CredentialOffer`] in the offer store) →
//! `Issued` (subject bound, credential signed by the toolkit).
//!
//! Redemption checks run in a fixed order: required fields (`id`, `hmac`,
//! `expires`), then `expires` parsing, then expiry, then the HMAC. Expiry is
//! inclusive: a token is redeemable during the second named by `expires`.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use credex_core::{CanonicalQuery, Did, ExchangeError, Timestamp};
use credex_crypto::{token, HmacSecret, TokenSignature};
use credex_vc::local::DID_KEY_METHOD;
use credex_vc::{CredentialOffer, Jwk, ProofOptions};

use crate::config::ProtocolConfig;
use crate::runner::ToolkitRunner;
use crate::OfferStore;

/// A minted offer token. Self-contained: the server keeps no record of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferToken {
    /// The offer id, a freshly derived DID.
    pub id: String,
    /// Expiry, `YYYY-MM-DDTHH:MM:SSZ`.
    pub expires: String,
    /// HMAC over `?id=<id>&expires=<expires>`.
    pub signature: TokenSignature,
}

impl OfferToken {
    /// The redeemable URL `<base>/offer?id=…&expires=…&hmac=…`.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `base_url` is not an absolute URL.
    pub fn url(&self, base_url: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!("{}/offer", base_url.trim_end_matches('/')),
            [
                ("id", self.id.as_str()),
                ("expires", self.expires.as_str()),
                ("hmac", self.signature.as_str()),
            ],
        )
    }
}

/// Mints, redeems, and issues credential offers.
#[derive(Debug, Clone)]
pub struct OfferService {
    config: Arc<ProtocolConfig>,
    offers: OfferStore,
    runner: ToolkitRunner,
}

impl OfferService {
    /// Create the service over an offer store and toolkit runner.
    pub fn new(config: Arc<ProtocolConfig>, offers: OfferStore, runner: ToolkitRunner) -> Self {
        Self {
            config,
            offers,
            runner,
        }
    }

    /// Mint a token for a fresh subject id, redeemable until
    /// `now + offer_ttl`. Stores nothing.
    pub async fn create_offer_token(&self, now: Timestamp) -> Result<OfferToken, ExchangeError> {
        let id = self.fresh_did().await?;
        let expires = shift(now, self.config.offer_ttl)?.to_canonical_string();
        let signature = sign(&self.config.hmac_secret, id.as_str(), &expires)?;
        tracing::info!(offer_id = %id, %expires, "offer token minted");
        Ok(OfferToken {
            id: id.into(),
            expires,
            signature,
        })
    }

    /// Validate a presented token and store the pending offer it unlocks,
    /// overwriting any earlier redemption of the same id.
    pub async fn redeem_offer(
        &self,
        id: &str,
        expires: &str,
        hmac: &str,
        now: Timestamp,
    ) -> Result<CredentialOffer, ExchangeError> {
        let result = self.check_token(id, expires, hmac, now);
        if let Err(e) = &result {
            tracing::info!(offer_id = id, reason = %e, "offer redemption rejected");
        }
        result?;

        let issuer = self.issuer_did().await?;
        let offer = CredentialOffer::new(id, &issuer, now, self.config.offer_ttl, expires)
            .map_err(|e| ExchangeError::Internal(e.to_string()))?;
        self.offers.put(
            id.to_string(),
            offer.clone(),
            offer.credential_preview.expiration_date,
        );
        tracing::info!(offer_id = id, "offer redeemed");
        Ok(offer)
    }

    /// Bind `subject_id` to the pending offer `id` and issue its credential.
    ///
    /// The subject is bound under the store's write lock, and the credential
    /// is signed from the record as bound, so a concurrent binding for the
    /// same id cannot leak into this issuance.
    pub async fn bind_subject_and_issue(
        &self,
        id: &str,
        subject_id: &str,
        now: Timestamp,
    ) -> Result<Value, ExchangeError> {
        if subject_id.is_empty() {
            return Err(ExchangeError::MissingField("subject_id"));
        }
        if id.is_empty() {
            return Err(ExchangeError::MissingField("id"));
        }
        let offer = self
            .offers
            .update(id, now, &mut |offer| offer.bind_subject(subject_id))
            .ok_or_else(|| {
                tracing::info!(offer_id = id, "issuance requested for unknown offer");
                ExchangeError::UnknownOffer(id.to_string())
            })?;
        let credential = self.issue(&offer).await?;
        tracing::info!(offer_id = id, subject = subject_id, "credential issued");
        Ok(credential)
    }

    /// Issue a credential for a fresh offer with no subject and no token
    /// gate. The offer is stored like a redeemed one.
    pub async fn issue_direct(&self, now: Timestamp) -> Result<Value, ExchangeError> {
        let id = self.fresh_did().await?;
        let issuer = self.issuer_did().await?;
        let expires = shift(now, self.config.offer_ttl)?.to_canonical_string();
        let offer = CredentialOffer::new(id.as_str(), &issuer, now, self.config.offer_ttl, expires)
            .map_err(|e| ExchangeError::Internal(e.to_string()))?;
        self.offers.put(
            id.to_string(),
            offer.clone(),
            offer.credential_preview.expiration_date,
        );
        let credential = self.issue(&offer).await?;
        tracing::info!(offer_id = %id, "credential issued without subject");
        Ok(credential)
    }

    /// Run the redemption checks without touching the store.
    pub fn check_token(
        &self,
        id: &str,
        expires: &str,
        hmac: &str,
        now: Timestamp,
    ) -> Result<(), ExchangeError> {
        check_token(&self.config.hmac_secret, id, expires, hmac, now)
    }

    async fn issue(&self, offer: &CredentialOffer) -> Result<Value, ExchangeError> {
        let issuer =
            Did::new(offer.issuer()).map_err(|e| ExchangeError::Internal(e.to_string()))?;
        let payload = serde_json::to_value(&offer.credential_preview)
            .map_err(|e| ExchangeError::Internal(e.to_string()))?;
        let options = ProofOptions::assertion(&issuer);
        let key = self.config.issuer_key.clone();
        self.runner
            .run("issue_credential", move |t| {
                t.issue_credential(&payload, &options, &key)
            })
            .await?
            .map_err(|e| {
                tracing::warn!(offer_id = offer.id(), error = %e, "credential issuance failed");
                ExchangeError::IssuanceFailed(e.to_string())
            })
    }

    async fn issuer_did(&self) -> Result<Did, ExchangeError> {
        let key = self.config.issuer_key.clone();
        self.runner
            .call("key_to_did", move |t| t.key_to_did(DID_KEY_METHOD, &key))
            .await
    }

    async fn fresh_did(&self) -> Result<Did, ExchangeError> {
        let key: Jwk = self
            .runner
            .call("generate_key", |t| t.generate_key())
            .await?;
        self.runner
            .call("key_to_did", move |t| t.key_to_did(DID_KEY_METHOD, &key))
            .await
    }
}

/// `now + ttl`, or [`ExchangeError::Internal`] when the configured lifetime
/// runs past the representable range.
pub(crate) fn shift(now: Timestamp, ttl: chrono::Duration) -> Result<Timestamp, ExchangeError> {
    now.plus(ttl)
        .map_err(|e| ExchangeError::Internal(e.to_string()))
}

/// Sign an `(id, expires)` pair.
///
/// # Errors
///
/// Returns [`ExchangeError::Internal`] if the MAC cannot be keyed.
pub fn sign(secret: &HmacSecret, id: &str, expires: &str) -> Result<TokenSignature, ExchangeError> {
    token::sign(&CanonicalQuery::offer(id, expires), secret)
        .map_err(|e| ExchangeError::Internal(e.to_string()))
}

/// The redemption checks, in order: required fields, `expires` parsing,
/// expiry, HMAC.
pub fn check_token(
    secret: &HmacSecret,
    id: &str,
    expires: &str,
    hmac: &str,
    now: Timestamp,
) -> Result<(), ExchangeError> {
    if id.is_empty() {
        return Err(ExchangeError::MissingField("id"));
    }
    if hmac.is_empty() {
        return Err(ExchangeError::MissingField("hmac"));
    }
    if expires.is_empty() {
        return Err(ExchangeError::MissingField("expires"));
    }
    let expires_at =
        Timestamp::parse(expires).map_err(|e| ExchangeError::MalformedToken(e.to_string()))?;
    if expires_at.is_passed_at(now.as_datetime()) {
        return Err(ExchangeError::Expired {
            expires: expires.to_string(),
        });
    }
    if !token::verify(&CanonicalQuery::offer(id, expires), hmac, secret) {
        return Err(ExchangeError::InvalidSignature);
    }
    Ok(())
}
