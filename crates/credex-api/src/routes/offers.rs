//! # Offer Routes
//!
//! - GET  /get-qr   — Mint an offer token, return its redeemable URL
//! - GET  /offer    — Redeem a token (`id`, `hmac`, `expires`) into a pending offer
//! - POST /offer    — Bind `subject_id` to offer `id` and issue the credential
//! - GET  /get-json — Issue a credential directly, with no token gate

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use credex_core::Timestamp;
use credex_vc::CredentialOffer;

use super::{base_url, UrlResponse};
use crate::error::AppError;
use crate::extractors::{extract_query, query_or_form, Fallback};
use crate::state::AppState;

/// Token fields presented at redemption.
#[derive(Debug, Default, Deserialize)]
pub struct RedeemParams {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub hmac: String,
    #[serde(default)]
    pub expires: String,
}

/// Fields of an issuance request.
#[derive(Debug, Default, Deserialize)]
pub struct IssueParams {
    pub id: Option<String>,
    pub subject_id: Option<String>,
}

impl Fallback for IssueParams {
    fn or(self, other: Self) -> Self {
        Self {
            id: self.id.or(other.id),
            subject_id: self.subject_id.or(other.subject_id),
        }
    }
}

/// Build the offer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-qr", get(mint_offer))
        .route("/offer", get(redeem_offer).post(issue_credential))
        .route("/get-json", get(issue_direct))
}

/// GET /get-qr — Mint a token and return the URL a wallet redeems it at.
async fn mint_offer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UrlResponse>, AppError> {
    let base = base_url(&state, &headers)?;
    let token = state.offers.create_offer_token(Timestamp::now()).await?;
    let url = token
        .url(&base)
        .map_err(|e| AppError::BadRequest(format!("cannot build offer URL from {base:?}: {e}")))?;
    Ok(Json(UrlResponse {
        url: url.to_string(),
    }))
}

/// GET /offer — Redeem a token into a pending offer.
async fn redeem_offer(
    State(state): State<AppState>,
    query: Result<Query<RedeemParams>, QueryRejection>,
) -> Result<Json<CredentialOffer>, AppError> {
    let params = extract_query(query)?;
    let offer = state
        .offers
        .redeem_offer(&params.id, &params.expires, &params.hmac, Timestamp::now())
        .await?;
    Ok(Json(offer))
}

/// POST /offer — Bind the wallet's DID and return the signed credential.
async fn issue_credential(
    State(state): State<AppState>,
    query: Result<Query<IssueParams>, QueryRejection>,
    form: Result<Form<IssueParams>, FormRejection>,
) -> Result<Json<Value>, AppError> {
    let params = query_or_form(query, form)?;
    let credential = state
        .offers
        .bind_subject_and_issue(
            params.id.as_deref().unwrap_or_default(),
            params.subject_id.as_deref().unwrap_or_default(),
            Timestamp::now(),
        )
        .await?;
    Ok(Json(credential))
}

/// GET /get-json — Issue a subject-less credential.
async fn issue_direct(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let credential = state.offers.issue_direct(Timestamp::now()).await?;
    Ok(Json(credential))
}
