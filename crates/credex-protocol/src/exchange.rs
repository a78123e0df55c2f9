//! # Exchange Service
//!
//! Challenge/response sign-in: a verifier hands out a
//! [`PresentationRequest`] bound to a fresh challenge and its own domain,
//! and later checks the presentation a holder returns for it.
//!
//! Stored requests are read-only. Answering one does not consume it; a
//! replayed presentation is caught only by the toolkit's challenge binding
//! or by the request's expiry.

use std::sync::Arc;

use serde_json::Value;

use credex_core::{ExchangeError, Timestamp};
use credex_vc::{PresentationRequest, VerifyOptions};

use crate::config::ProtocolConfig;
use crate::offer::shift;
use crate::runner::ToolkitRunner;
use crate::ExchangeStore;

/// Issues presentation requests and verifies presentations.
#[derive(Debug, Clone)]
pub struct ExchangeService {
    config: Arc<ProtocolConfig>,
    requests: ExchangeStore,
    runner: ToolkitRunner,
}

impl ExchangeService {
    /// Create the service over a request store and toolkit runner.
    pub fn new(
        config: Arc<ProtocolConfig>,
        requests: ExchangeStore,
        runner: ToolkitRunner,
    ) -> Self {
        Self {
            config,
            requests,
            runner,
        }
    }

    /// Store and return a sign-in request for `domain` with a fresh
    /// challenge, answerable until `now + request_ttl`.
    pub fn create_presentation_request(
        &self,
        domain: &str,
        now: Timestamp,
    ) -> Result<PresentationRequest, ExchangeError> {
        let retain_until = shift(now, self.config.request_ttl)?;
        let request = PresentationRequest::sign_in(domain);
        self.requests.put(
            request.challenge.as_str().to_string(),
            request.clone(),
            retain_until,
        );
        tracing::info!(challenge = request.challenge.as_str(), domain, "presentation request created");
        Ok(request)
    }

    /// Verify a holder's presentation against the request stored under
    /// `challenge`.
    ///
    /// Order: required fields, presentation parsing, toolkit verification of
    /// the presentation, credential extraction, toolkit verification of the
    /// credential, and finally `holder == credentialSubject.id`.
    pub async fn verify_presentation(
        &self,
        challenge: &str,
        presentation: &str,
        domain: &str,
        now: Timestamp,
    ) -> Result<(), ExchangeError> {
        let outcome = self.check(challenge, presentation, domain, now).await;
        match &outcome {
            Ok(()) => tracing::info!(challenge, "presentation accepted"),
            Err(e) => tracing::info!(challenge, reason = %e, "presentation rejected"),
        }
        outcome
    }

    async fn check(
        &self,
        challenge: &str,
        presentation: &str,
        domain: &str,
        now: Timestamp,
    ) -> Result<(), ExchangeError> {
        if challenge.is_empty() {
            return Err(ExchangeError::MissingField("challenge"));
        }
        if presentation.is_empty() {
            return Err(ExchangeError::MissingField("presentation"));
        }
        let vp: Value = serde_json::from_str(presentation)
            .map_err(|e| ExchangeError::MalformedPresentation(e.to_string()))?;
        if !vp.is_object() {
            return Err(ExchangeError::MalformedPresentation(
                "expected a JSON object".into(),
            ));
        }

        let options = VerifyOptions::authentication(self.requests.get(challenge, now), domain);

        let vp_result = {
            let (vp, options) = (vp.clone(), options.clone());
            self.runner
                .call("verify_presentation", move |t| {
                    t.verify_presentation(&vp, &options)
                })
                .await?
        };
        if !vp_result.is_verified() {
            return Err(ExchangeError::PresentationVerificationFailed(
                vp_result.errors,
            ));
        }

        let credential = embedded_credential(&vp).ok_or(ExchangeError::MissingCredential)?;

        let vc_result = {
            let credential = credential.clone();
            self.runner
                .call("verify_credential", move |t| {
                    t.verify_credential(&credential, &options)
                })
                .await?
        };
        if !vc_result.is_verified() {
            return Err(ExchangeError::CredentialVerificationFailed(
                vc_result.errors,
            ));
        }

        let holder = vp.get("holder").and_then(Value::as_str);
        let subject = credential
            .get("credentialSubject")
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str);
        if holder.is_none() || holder != subject {
            return Err(ExchangeError::SubjectHolderMismatch {
                holder: holder.map(str::to_string),
                subject: subject.map(str::to_string),
            });
        }
        Ok(())
    }
}

/// The presentation's `verifiableCredential`: the object itself, or the
/// first element of a non-empty array.
fn embedded_credential(vp: &Value) -> Option<&Value> {
    match vp.get("verifiableCredential")? {
        Value::Array(items) => items.first(),
        Value::Null => None,
        credential => Some(credential),
    }
}
