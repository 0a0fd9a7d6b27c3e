use crate::errors::GatewayError;
use actix_web::{http::StatusCode, HttpResponse};
use log::{debug, warn};
use serde_json::{json, Value};

/// Used when a non-JSON error body is empty or whitespace-only.
pub const OPAQUE_FALLBACK_MESSAGE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Error body that parsed as JSON; forwarded untouched.
    Structured(Value),
    /// Error body that did not parse; wrapped as `{ "error": text }`.
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Success { status: u16, body: Value },
    Failure { status: u16, error: BackendError },
}

/// Decode a buffered backend body according to its status class.
///
/// The bytes are decoded as JSON first; on failure of a non-2xx body the
/// same buffer is decoded again as text.
pub fn normalize(status: u16, raw: &[u8]) -> Result<Normalized, GatewayError> {
    if (200..300).contains(&status) {
        let body = serde_json::from_slice(raw).map_err(|e| {
            warn!("Backend returned {} with a body that is not JSON: {}", status, e);
            GatewayError::MalformedSuccessBody(e)
        })?;
        return Ok(Normalized::Success { status, body });
    }

    let error = match serde_json::from_slice::<Value>(raw) {
        Ok(value) => BackendError::Structured(value),
        Err(e) => {
            debug!("Error body for status {} is not JSON ({}), wrapping as text", status, e);
            let text = String::from_utf8_lossy(raw);
            if text.trim().is_empty() {
                BackendError::Opaque(OPAQUE_FALLBACK_MESSAGE.to_string())
            } else {
                BackendError::Opaque(text.into_owned())
            }
        }
    };

    Ok(Normalized::Failure { status, error })
}

impl Normalized {
    pub fn status(&self) -> u16 {
        match self {
            Normalized::Success { status, .. } | Normalized::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Normalized::Success { .. })
    }

    /// The JSON body of a successful response.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Normalized::Success { body, .. } => Some(body),
            Normalized::Failure { .. } => None,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status()).unwrap_or_else(|_| {
            warn!("Backend status {} is not representable, answering 502", self.status());
            StatusCode::BAD_GATEWAY
        });

        let body = match self {
            Normalized::Success { body, .. } => body,
            Normalized::Failure { error: BackendError::Structured(value), .. } => value,
            Normalized::Failure { error: BackendError::Opaque(text), .. } => json!({ "error": text }),
        };

        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn response_parts(normalized: Normalized) -> (u16, Value) {
        let response = normalized.into_response();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn success_body_is_parsed() {
        let normalized = normalize(201, br#"{"id":"42"}"#).unwrap();
        assert_eq!(normalized, Normalized::Success { status: 201, body: json!({ "id": "42" }) });
    }

    #[test]
    fn malformed_success_body_is_an_error() {
        let err = normalize(200, b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedSuccessBody(_)));
    }

    #[test]
    fn json_error_body_is_structured() {
        let normalized = normalize(404, br#"{"message":"X"}"#).unwrap();
        assert_eq!(
            normalized,
            Normalized::Failure {
                status: 404,
                error: BackendError::Structured(json!({ "message": "X" })),
            }
        );
    }

    #[test]
    fn text_error_body_is_opaque() {
        let normalized = normalize(502, b"Bad Gateway\n").unwrap();
        assert_eq!(
            normalized,
            Normalized::Failure {
                status: 502,
                error: BackendError::Opaque("Bad Gateway\n".to_string()),
            }
        );
    }

    #[test]
    fn whitespace_error_body_uses_fallback() {
        let normalized = normalize(504, b" \r\n ").unwrap();
        assert_eq!(
            normalized,
            Normalized::Failure {
                status: 504,
                error: BackendError::Opaque(OPAQUE_FALLBACK_MESSAGE.to_string()),
            }
        );
    }

    #[test]
    fn empty_error_body_uses_fallback() {
        let normalized = normalize(500, b"").unwrap();
        assert_eq!(
            normalized,
            Normalized::Failure {
                status: 500,
                error: BackendError::Opaque(OPAQUE_FALLBACK_MESSAGE.to_string()),
            }
        );
    }

    #[actix_web::test]
    async fn structured_error_forwarded_verbatim() {
        let normalized = normalize(409, br#"{"message":"Already reserved","code":7}"#).unwrap();
        let (status, body) = response_parts(normalized).await;
        assert_eq!(status, 409);
        assert_eq!(body, json!({ "message": "Already reserved", "code": 7 }));
    }

    #[actix_web::test]
    async fn opaque_error_wrapped() {
        let normalized = normalize(503, b"upstream unavailable").unwrap();
        let (status, body) = response_parts(normalized).await;
        assert_eq!(status, 503);
        assert_eq!(body, json!({ "error": "upstream unavailable" }));
    }
}
