//! # Route Modules
//!
//! Each module defines an Axum Router for one side of the exchange.
//! Routers are assembled in [`crate::app`].

pub mod offers;
pub mod presentations;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::request_host;
use crate::state::AppState;

/// A URL for the wallet to open, as rendered into a QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlResponse {
    pub url: String,
}

/// Base for minted URLs: the configured public URL, else `http://<Host>`.
fn base_url(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    match &state.public_url {
        Some(url) => Ok(url.clone()),
        None => Ok(format!("http://{}", request_host(headers)?)),
    }
}
