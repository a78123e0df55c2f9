//! # Presentation Routes
//!
//! - GET  /present    — URL of the presentation request endpoint
//! - GET  /vp-request — Create a sign-in request bound to this host
//! - POST /vp-request — Verify a presentation (`challenge`, `presentation`)

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use credex_core::Timestamp;
use credex_vc::PresentationRequest;

use super::{base_url, UrlResponse};
use crate::error::AppError;
use crate::extractors::{query_or_form, request_host, Fallback};
use crate::state::AppState;

/// Fields of a presentation submission.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    pub challenge: Option<String>,
    /// The signed presentation, as JSON text.
    pub presentation: Option<String>,
}

impl Fallback for VerifyParams {
    fn or(self, other: Self) -> Self {
        Self {
            challenge: self.challenge.or(other.challenge),
            presentation: self.presentation.or(other.presentation),
        }
    }
}

/// Build the presentation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/present", get(present))
        .route("/vp-request", get(create_request).post(verify_presentation))
}

/// GET /present — Where a wallet fetches its presentation request.
async fn present(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UrlResponse>, AppError> {
    let base = base_url(&state, &headers)?;
    Ok(Json(UrlResponse {
        url: format!("{}/vp-request", base.trim_end_matches('/')),
    }))
}

/// GET /vp-request — Store and return a fresh sign-in request.
async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PresentationRequest>, AppError> {
    let domain = request_host(&headers)?;
    let request = state
        .exchange
        .create_presentation_request(domain, Timestamp::now())?;
    Ok(Json(request))
}

/// POST /vp-request — Accept or reject a presentation.
async fn verify_presentation(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<VerifyParams>, QueryRejection>,
    form: Result<Form<VerifyParams>, FormRejection>,
) -> Result<Json<Value>, AppError> {
    let params = query_or_form(query, form)?;
    let domain = request_host(&headers)?;
    state
        .exchange
        .verify_presentation(
            params.challenge.as_deref().unwrap_or_default(),
            params.presentation.as_deref().unwrap_or_default(),
            domain,
            Timestamp::now(),
        )
        .await?;
    Ok(Json(json!({})))
}
