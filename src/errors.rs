use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use log::{warn, error};
use thiserror::Error;

pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

// Errors surfaced at the route boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Missing path parameter `{0}`")]
    MissingPathParam(String),

    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("{0}")]
    Backend(#[from] reqwest::Error),

    #[error("Malformed JSON in backend response: {0}")]
    MalformedSuccessBody(#[source] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        match self {
            GatewayError::AuthenticationRequired => {
                warn!("\x1B[1;33mAUTHENTICATION REQUIRED:\x1B[0m no credential cookie on request");
                HttpResponse::Unauthorized().json(json!({ "message": AUTH_REQUIRED_MESSAGE }))
            },
            other => {
                let message = other.to_string();
                error!("\x1B[1;31mGATEWAY ERROR:\x1B[0m {}", message);
                let message = if message.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    message
                };
                HttpResponse::InternalServerError().json(json!({ "error": message }))
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            GatewayError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Errors from the schema layer
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Database error: {0}")]
    Diesel(#[from] diesel::result::Error),

    #[error("Database connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: GatewayError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn authentication_required_uses_message_key() {
        let (status, body) = body_json(GatewayError::AuthenticationRequired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Authentication required" }));
    }

    #[actix_web::test]
    async fn other_errors_become_500_with_error_key() {
        let (status, body) = body_json(GatewayError::MissingPathParam("id".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Missing path parameter `id`" }));
    }

    #[actix_web::test]
    async fn empty_message_falls_back_to_generic_text() {
        let (_, body) = body_json(GatewayError::Internal(String::new())).await;
        assert_eq!(body, json!({ "error": GENERIC_ERROR_MESSAGE }));
    }
}
