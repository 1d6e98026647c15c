use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reactx_core::ReactxError;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

/// Standard HTTP error body: `{ "error": <message>, "status": "error" }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `(status, body)` pair in the shape the inner handlers return.
    pub fn into_parts(self) -> (StatusCode, serde_json::Value) {
        let status = self.status();
        let body = serde_json::json!(ErrorResponse::new(self.to_string()));
        (status, body)
    }
}

impl From<ReactxError> for ApiError {
    fn from(e: ReactxError) -> Self {
        match e {
            ReactxError::Validation(msg) => ApiError::BadRequest(msg),
            ReactxError::Conflict(msg) => ApiError::Conflict(msg),
            ReactxError::NotFound(msg) => ApiError::NotFound(msg),
            other => {
                tracing::error!(error = %other, "store error");
                ApiError::Internal("Internal server error.".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => {
                ApiError::Unauthorized("Not authorized, no token provided.".to_string())
            }
            AuthError::InvalidToken(_) => {
                ApiError::Unauthorized("Not authorized, token is invalid.".to_string())
            }
            other => {
                tracing::error!(error = %other, "auth error");
                ApiError::Internal("Internal server error.".to_string())
            }
        }
    }
}

/// Body or query strings that fail to parse get the same JSON error shape
/// as every other 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        let cases = [
            (ReactxError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ReactxError::Conflict("taken".into()), StatusCode::CONFLICT),
            (ReactxError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ReactxError::Other("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_error_body_shape() {
        let (status, body) = ApiError::Conflict("Username already taken.".into()).into_parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already taken.");
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (_, body) = ApiError::from(ReactxError::Other("db password is hunter2".into())).into_parts();
        assert_eq!(body["error"], "Internal server error.");
    }
}
