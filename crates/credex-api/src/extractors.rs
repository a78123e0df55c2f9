//! # Request Field Extraction
//!
//! Wallet endpoints accept their fields either in the query string or in a
//! form body. A field present in the query wins; the form is the fallback.

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query};
use axum::http::header::HOST;
use axum::http::HeaderMap;

use crate::error::AppError;

/// Field sets that can fill their gaps from a second source.
pub trait Fallback {
    /// Keep every field set in `self`, taking the rest from `other`.
    fn or(self, other: Self) -> Self;
}

/// Extract query parameters, mapping deserialization errors to
/// [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Merge query parameters over a form body.
///
/// A request without a form content type (a bare POST carrying only a
/// query string) has an empty form. A form body that fails to decode is a
/// [`AppError::BadRequest`].
pub fn query_or_form<T: Fallback + Default>(
    query: Result<Query<T>, QueryRejection>,
    form: Result<Form<T>, FormRejection>,
) -> Result<T, AppError> {
    let query = extract_query(query)?;
    let form = match form {
        Ok(Form(v)) => v,
        Err(FormRejection::InvalidFormContentType(_)) => T::default(),
        Err(err) => return Err(AppError::BadRequest(err.body_text())),
    };
    Ok(query.or(form))
}

/// The request's `Host` header.
pub fn request_host(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing Host header".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        a: Option<String>,
        b: Option<String>,
    }

    impl Fallback for Pair {
        fn or(self, other: Self) -> Self {
            Self {
                a: self.a.or(other.a),
                b: self.b.or(other.b),
            }
        }
    }

    #[test]
    fn query_wins_over_form() {
        let query = Pair {
            a: Some("from-query".into()),
            b: None,
        };
        let form = Pair {
            a: Some("from-form".into()),
            b: Some("form-only".into()),
        };
        assert_eq!(
            query.or(form),
            Pair {
                a: Some("from-query".into()),
                b: Some("form-only".into()),
            }
        );
    }

    #[test]
    fn host_header_required() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            request_host(&headers),
            Err(AppError::BadRequest(_))
        ));
        headers.insert(HOST, HeaderValue::from_static("issuer.example:8080"));
        assert_eq!(request_host(&headers).unwrap(), "issuer.example:8080");
    }
}
