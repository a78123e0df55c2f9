//! # credex-api — HTTP Surface for credex
//!
//! ## API Surface
//!
//! | Method/Path          | Module                       | Purpose                          |
//! |----------------------|------------------------------|----------------------------------|
//! | `GET /get-qr`        | [`routes::offers`]           | Mint an offer token URL          |
//! | `GET /offer`         | [`routes::offers`]           | Redeem a token into an offer     |
//! | `POST /offer`        | [`routes::offers`]           | Bind a subject, issue credential |
//! | `GET /get-json`      | [`routes::offers`]           | Issue directly, no token         |
//! | `GET /present`       | [`routes::presentations`]    | Presentation request URL         |
//! | `GET /vp-request`    | [`routes::presentations`]    | Create a presentation request    |
//! | `POST /vp-request`   | [`routes::presentations`]    | Verify a presentation            |
//! | `GET /metrics`       | [`middleware::metrics`]      | Request counters                 |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
///
/// Health probes (`/health/*`) sit outside the metrics and trace layers.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::offers::router())
        .merge(routes::presentations::router())
        .route("/metrics", get(middleware::metrics::metrics_snapshot))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once state is built and the router is serving.
async fn readiness() -> &'static str {
    "ready"
}
