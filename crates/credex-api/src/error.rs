//! # API Error Types
//!
//! Maps [`ExchangeError`] rejections onto HTTP status codes and a JSON
//! body `{"error": {"code", "message", "details"?}}`. Internal error
//! details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use credex_core::ExchangeError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "OFFER_EXPIRED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Toolkit error lists and mismatch details, when there are any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// A protocol rejection.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// The request itself is unusable (e.g. no `Host` header) (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Exchange(e) => match e {
                ExchangeError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
                ExchangeError::MalformedToken(_) => (StatusCode::BAD_REQUEST, "MALFORMED_TOKEN"),
                ExchangeError::Expired { .. } => (StatusCode::GONE, "OFFER_EXPIRED"),
                ExchangeError::InvalidSignature => (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE"),
                ExchangeError::UnknownOffer(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_OFFER"),
                ExchangeError::IssuanceFailed(_) => (StatusCode::BAD_REQUEST, "ISSUANCE_FAILED"),
                ExchangeError::PresentationVerificationFailed(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PRESENTATION_VERIFICATION_FAILED",
                ),
                ExchangeError::CredentialVerificationFailed(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CREDENTIAL_VERIFICATION_FAILED",
                ),
                ExchangeError::MissingCredential => (StatusCode::BAD_REQUEST, "MISSING_CREDENTIAL"),
                ExchangeError::MalformedPresentation(_) => {
                    (StatusCode::BAD_REQUEST, "MALFORMED_PRESENTATION")
                }
                ExchangeError::SubjectHolderMismatch { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "SUBJECT_HOLDER_MISMATCH")
                }
                ExchangeError::ToolkitTimeout { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, "TOOLKIT_TIMEOUT")
                }
                ExchangeError::Toolkit { .. } => (StatusCode::BAD_GATEWAY, "TOOLKIT_ERROR"),
                ExchangeError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Exchange(ExchangeError::Internal(_))
        )
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Exchange(ExchangeError::PresentationVerificationFailed(errors))
            | Self::Exchange(ExchangeError::CredentialVerificationFailed(errors)) => {
                Some(json!(errors))
            }
            Self::Exchange(ExchangeError::SubjectHolderMismatch { holder, subject }) => {
                Some(json!({"holder": holder, "subject": subject}))
            }
            Self::Exchange(ExchangeError::Expired { expires }) => Some(json!({"expires": expires})),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: ExchangeError) -> (StatusCode, &'static str) {
        AppError::from(err).status_and_code()
    }

    #[test]
    fn client_errors() {
        assert_eq!(
            status(ExchangeError::MissingField("id")),
            (StatusCode::BAD_REQUEST, "MISSING_FIELD")
        );
        assert_eq!(
            status(ExchangeError::InvalidSignature),
            (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE")
        );
        assert_eq!(
            status(ExchangeError::UnknownOffer("x".into())),
            (StatusCode::BAD_REQUEST, "UNKNOWN_OFFER")
        );
        assert_eq!(
            status(ExchangeError::MissingCredential),
            (StatusCode::BAD_REQUEST, "MISSING_CREDENTIAL")
        );
    }

    #[test]
    fn expired_is_gone() {
        assert_eq!(
            status(ExchangeError::Expired {
                expires: "2024-01-01T00:15:00Z".into()
            }),
            (StatusCode::GONE, "OFFER_EXPIRED")
        );
    }

    #[test]
    fn verification_failures_are_unprocessable() {
        assert_eq!(
            status(ExchangeError::PresentationVerificationFailed(vec![])).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ExchangeError::CredentialVerificationFailed(vec![])).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ExchangeError::SubjectHolderMismatch {
                holder: None,
                subject: None
            })
            .0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn toolkit_failures_are_gateway_errors() {
        assert_eq!(
            status(ExchangeError::ToolkitTimeout { operation: "x" }),
            (StatusCode::GATEWAY_TIMEOUT, "TOOLKIT_TIMEOUT")
        );
        assert_eq!(
            status(ExchangeError::Toolkit {
                operation: "x",
                detail: "y".into()
            }),
            (StatusCode::BAD_GATEWAY, "TOOLKIT_ERROR")
        );
    }

    #[test]
    fn verification_errors_become_details() {
        let err = AppError::from(ExchangeError::CredentialVerificationFailed(vec![
            "signature error".into(),
        ]));
        assert_eq!(err.details(), Some(json!(["signature error"])));
        assert!(AppError::BadRequest("x".into()).details().is_none());
    }

    #[test]
    fn internal_errors_are_internal() {
        assert!(AppError::Internal("x".into()).is_internal());
        assert!(AppError::from(ExchangeError::Internal("x".into())).is_internal());
        assert!(!AppError::from(ExchangeError::InvalidSignature).is_internal());
        assert_eq!(
            AppError::Internal("x".into()).status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }
}
