use reqwest::StatusCode;
use serde::Deserialize;

/// ApiError
///
/// Every failure the gateway client can surface to a view. Views never inspect
/// the transport; they ask for `user_message` with their own fallback string.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response, or the body could not be decoded.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request failed with status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// A file attached to a multipart body was rejected before sending.
    #[error("Invalid upload: {0}")]
    Upload(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            ApiError::Upload(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// The `message` field the server put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Inline text for a form or banner: the server's message when it sent one,
    /// otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Shape of the JSON error body returned by the REST API.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

/// PersistError
///
/// Failures of the durable client storage (session and theme keys).
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment is incomplete.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// StorageError
///
/// Failures reported by the object-storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_message() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Category already exists".into()),
        };
        assert_eq!(err.user_message("Failed to save."), "Category already exists");
    }

    #[test]
    fn user_message_falls_back_when_server_is_silent() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(err.user_message("Failed to save."), "Failed to save.");

        let blank = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("   ".into()),
        };
        assert_eq!(blank.user_message("Failed to save."), "Failed to save.");
    }

    #[test]
    fn status_classification() {
        let not_found = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: None,
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_unauthorized());

        let forbidden = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            message: None,
        };
        assert!(forbidden.is_unauthorized());
        assert!(ApiError::Upload("x".into()).status().is_none());
    }
}
