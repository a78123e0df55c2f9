//! # Integration Tests for credex-api
//!
//! Drives the full router: health probes, metrics, the offer flow from token
//! to signed credential, and presentation request/verification.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use credex_api::error::ErrorBody;
use credex_api::middleware::metrics::MetricsSnapshot;
use credex_api::state::AppState;
use credex_core::Did;
use credex_crypto::HmacSecret;
use credex_protocol::ProtocolConfig;
use credex_vc::local::DID_KEY_METHOD;
use credex_vc::{DidToolkit, Jwk, LocalToolkit, ProofOptions, VerifyOptions};

const HOST: &str = "issuer.test";

fn secret() -> HmacSecret {
    HmacSecret::new(b"integration-secret".to_vec()).unwrap()
}

fn issuer_key() -> Jwk {
    LocalToolkit::key_from_seed(&[7; 32])
}

/// Helper: build the test app over a fixed secret and issuer key.
fn test_app() -> axum::Router {
    test_app_with_url(None)
}

fn test_app_with_url(public_url: Option<&str>) -> axum::Router {
    let config = ProtocolConfig::new(secret(), issuer_key());
    let state = AppState::new(
        config,
        Arc::new(LocalToolkit::new()),
        public_url.map(str::to_string),
    );
    credex_api::app(state)
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

async fn error_code(response: axum::http::Response<Body>) -> String {
    let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    body.error.code
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn holder_key() -> Jwk {
    LocalToolkit::key_from_seed(&[3; 32])
}

fn did_of(key: &Jwk) -> Did {
    LocalToolkit::new().key_to_did(DID_KEY_METHOD, key).unwrap()
}

/// Mint a token over HTTP and return the `/offer?…` path it redeems at.
async fn mint(app: &axum::Router) -> (String, url::Url) {
    let response = app.clone().oneshot(get("/get-qr")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let url = url::Url::parse(body_json(response).await["url"].as_str().unwrap()).unwrap();
    let id = url
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    (id, url)
}

/// Run the whole offer flow for `subject` and return the signed credential.
async fn issue_to(app: &axum::Router, subject: &Did) -> Value {
    let (id, url) = mint(app).await;
    let path = format!("{}?{}", url.path(), url.query().unwrap());
    let response = app.clone().oneshot(get(&path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_form(
            "/offer",
            &[("id", id.as_str()), ("subject_id", subject.as_str())],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Fetch a presentation request and answer it as `holder_key`.
async fn present(app: &axum::Router, credential: Value, domain: &str) -> (String, Value) {
    let response = app.clone().oneshot(get("/vp-request")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let request = body_json(response).await;
    let challenge = request["challenge"].as_str().unwrap().to_string();

    let holder = did_of(&holder_key());
    let unsigned = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiablePresentation"],
        "holder": holder,
        "verifiableCredential": credential,
    });
    let presentation = LocalToolkit::new()
        .issue_presentation(
            &unsigned,
            &ProofOptions::authentication(&holder, &challenge, domain),
            &holder_key(),
        )
        .unwrap();
    (challenge, presentation)
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(get("/health/liveness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app()
        .oneshot(get("/health/readiness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_count_requests_and_errors() {
    let app = test_app();
    app.clone().oneshot(get("/get-json")).await.unwrap();
    app.clone().oneshot(get("/offer")).await.unwrap();

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: MetricsSnapshot = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(snapshot.errors, 1);
    assert!(snapshot.requests >= 2);
}

// -- Offers -------------------------------------------------------------------

#[tokio::test]
async fn test_get_qr_returns_offer_url_for_host() {
    let (id, url) = mint(&test_app()).await;
    assert_eq!(url.scheme(), "http");
    assert_eq!(url.host_str(), Some(HOST));
    assert_eq!(url.path(), "/offer");
    assert!(id.starts_with("did:key:"));
    let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(keys, ["id", "expires", "hmac"]);
}

#[tokio::test]
async fn test_public_url_overrides_host() {
    let app = test_app_with_url(Some("https://wallet-facing.example"));
    let (_, url) = mint(&app).await;
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.host_str(), Some("wallet-facing.example"));

    let response = app.oneshot(get("/present")).await.unwrap();
    assert_eq!(
        body_json(response).await["url"],
        "https://wallet-facing.example/vp-request"
    );
}

#[tokio::test]
async fn test_get_qr_without_host_is_bad_request() {
    let request = Request::builder()
        .uri("/get-qr")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "BAD_REQUEST");
}

#[tokio::test]
async fn test_redeem_returns_offer() {
    let app = test_app();
    let (id, url) = mint(&app).await;
    let path = format!("{}?{}", url.path(), url.query().unwrap());
    let response = app.oneshot(get(&path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let offer = body_json(response).await;
    assert_eq!(offer["type"], "CredentialOffer");
    assert_eq!(offer["credentialPreview"]["id"], id.as_str());
    assert_eq!(offer["credentialPreview"]["issuer"], did_of(&issuer_key()).as_str());
    assert_eq!(offer["credentialPreview"]["type"], "VerifiableCredential");
    assert_eq!(offer["credentialPreview"]["credentialSubject"], json!({}));
    assert_eq!(
        offer["expires"],
        url.query_pairs()
            .find(|(k, _)| k == "expires")
            .map(|(_, v)| v.into_owned())
            .unwrap()
            .as_str()
    );
}

#[tokio::test]
async fn test_full_offer_flow_issues_verifiable_credential() {
    let app = test_app();
    let holder = did_of(&holder_key());
    let credential = issue_to(&app, &holder).await;

    assert_eq!(credential["credentialSubject"]["id"], holder.as_str());
    assert_eq!(credential["issuer"], did_of(&issuer_key()).as_str());
    assert_eq!(credential["proof"]["proofPurpose"], "assertionMethod");

    let result = LocalToolkit::new()
        .verify_credential(&credential, &VerifyOptions::authentication(None, HOST))
        .unwrap();
    assert!(result.is_verified(), "{:?}", result.errors);
}

#[tokio::test]
async fn test_issue_fields_from_query_win_over_form() {
    let app = test_app();
    let (id, url) = mint(&app).await;
    let path = format!("{}?{}", url.path(), url.query().unwrap());
    app.clone().oneshot(get(&path)).await.unwrap();

    let uri = format!(
        "/offer?{}",
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("subject_id", "did:key:from-query")
            .finish()
    );
    let response = app
        .oneshot(post_form(
            &uri,
            &[("id", id.as_str()), ("subject_id", "did:key:from-form")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["credentialSubject"]["id"],
        "did:key:from-query"
    );
}

#[tokio::test]
async fn test_expired_token_is_gone() {
    let id = "did:key:uexpired";
    let expires = "2020-01-01T00:00:00Z";
    let hmac = credex_protocol::offer::sign(&secret(), id, expires).unwrap();
    let uri = format!(
        "/offer?{}",
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id", id)
            .append_pair("expires", expires)
            .append_pair("hmac", hmac.as_str())
            .finish()
    );
    let response = test_app().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(error_code(response).await, "OFFER_EXPIRED");
}

#[tokio::test]
async fn test_tampered_hmac_is_bad_request() {
    let app = test_app();
    let (_, url) = mint(&app).await;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "hmac" {
                "0".repeat(v.len())
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let uri = format!(
        "/offer?{}",
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    );
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "INVALID_SIGNATURE");
}

#[tokio::test]
async fn test_malformed_expiry_is_bad_request() {
    let response = test_app()
        .oneshot(get("/offer?id=did:key:a&hmac=00&expires=tomorrow"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "MALFORMED_TOKEN");
}

#[tokio::test]
async fn test_redeem_missing_fields() {
    let response = test_app().oneshot(get("/offer")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body.error.code, "MISSING_FIELD");
    assert!(body.error.message.contains("'id'"));
}

#[tokio::test]
async fn test_issue_for_unknown_offer_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/offer?id=did:key:never-created&subject_id=did:key:holder")
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "UNKNOWN_OFFER");
}

#[tokio::test]
async fn test_issue_requires_subject_id_first() {
    let response = test_app()
        .oneshot(post_form("/offer", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body.error.message.contains("'subject_id'"));
}

#[tokio::test]
async fn test_get_json_issues_without_subject() {
    let response = test_app().oneshot(get("/get-json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let credential = body_json(response).await;
    assert_eq!(credential["credentialSubject"], json!({}));
    assert!(credential["proof"]["proofValue"].is_string());
}

// -- Presentations ------------------------------------------------------------

#[tokio::test]
async fn test_present_points_at_vp_request() {
    let response = test_app().oneshot(get("/present")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["url"], "http://issuer.test/vp-request");
}

#[tokio::test]
async fn test_vp_request_shape() {
    let response = test_app().oneshot(get("/vp-request")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let request = body_json(response).await;
    assert_eq!(request["type"], "VerifiablePresentationRequest");
    assert_eq!(request["domain"], HOST);
    assert_eq!(request["query"]["type"], "QueryByExample");
    assert_eq!(request["query"]["credentialQuery"]["reason"], "Sign in");
    assert!(!request["challenge"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_presentation_accepted() {
    let app = test_app();
    let credential = issue_to(&app, &did_of(&holder_key())).await;
    let (challenge, presentation) = present(&app, credential, HOST).await;

    let response = app
        .oneshot(post_form(
            "/vp-request",
            &[
                ("challenge", challenge.as_str()),
                ("presentation", presentation.to_string().as_str()),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn test_presentation_by_other_holder_is_unprocessable() {
    let app = test_app();
    let someone_else = did_of(&LocalToolkit::key_from_seed(&[4; 32]));
    let credential = issue_to(&app, &someone_else).await;
    let (challenge, presentation) = present(&app, credential, HOST).await;

    let response = app
        .oneshot(post_form(
            "/vp-request",
            &[
                ("challenge", challenge.as_str()),
                ("presentation", presentation.to_string().as_str()),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body.error.code, "SUBJECT_HOLDER_MISMATCH");
    assert_eq!(
        body.error.details.unwrap()["subject"],
        someone_else.as_str()
    );
}

#[tokio::test]
async fn test_presentation_for_other_domain_is_unprocessable() {
    let app = test_app();
    let credential = issue_to(&app, &did_of(&holder_key())).await;
    let (challenge, presentation) = present(&app, credential, "elsewhere.test").await;

    let response = app
        .oneshot(post_form(
            "/vp-request",
            &[
                ("challenge", challenge.as_str()),
                ("presentation", presentation.to_string().as_str()),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body.error.code, "PRESENTATION_VERIFICATION_FAILED");
    let details = body.error.details.unwrap();
    assert!(details
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e.as_str().unwrap().contains("domain mismatch")));
}

#[tokio::test]
async fn test_malformed_presentation_is_bad_request() {
    let response = test_app()
        .oneshot(post_form(
            "/vp-request",
            &[("challenge", "abc"), ("presentation", "not json")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "MALFORMED_PRESENTATION");
}

#[tokio::test]
async fn test_presentation_missing_challenge() {
    let response = test_app()
        .oneshot(post_form("/vp-request", &[("presentation", "{}")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body.error.code, "MISSING_FIELD");
    assert!(body.error.message.contains("'challenge'"));
}
