//! Backend error types

use thiserror::Error;

/// Errors raised by backend calls; they always propagate to the caller
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("session expired or credentials rejected")]
    Unauthorized,
    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("backend returned no record")]
    EmptyResponse,
    #[error("could not read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, BackendError::Unauthorized)
    }

    /// Short message suitable for the error dialog
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            BackendError::Unauthorized => {
                "Your session has expired. Please sign in again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_detection() {
        assert!(BackendError::Unauthorized.is_auth_error());
        assert!(!BackendError::EmptyResponse.is_auth_error());
    }

    #[test]
    fn test_user_message_hides_network_detail() {
        let err = BackendError::Network("dns error: tcp connect".to_string());
        assert!(!err.user_message().contains("dns"));
        assert_eq!(
            BackendError::Unauthorized.user_message(),
            "Your session has expired. Please sign in again."
        );
    }

    #[test]
    fn test_http_error_display() {
        let err = BackendError::Http {
            status: 409,
            message: "duplicate key".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 409: duplicate key");
    }
}
