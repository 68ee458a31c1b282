use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::StorageError;

/// BackendError
///
/// Every failure a handler can return. Rendered as `{"message": "..."}` with the
/// matching status, which is exactly what the gateway client reads back.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl BackendError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            BackendError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            BackendError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            BackendError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            BackendError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            BackendError::Storage(StorageError::Rejected(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            BackendError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Image upload failed".to_string(),
                )
            }
            BackendError::Token(e) => {
                tracing::error!("Token error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            BackendError::Hash(e) => {
                tracing::error!("Password hashing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: BackendError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_message_body() {
        let (status, body) = body_of(BackendError::not_found("Blog")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Blog not found");
    }

    #[tokio::test]
    async fn storage_backend_failure_hides_details() {
        let (status, body) =
            body_of(BackendError::Storage(StorageError::Backend("s3 down".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Image upload failed");
    }
}
