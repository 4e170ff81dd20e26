//! Infrastructure-level errors: failures at the remote API boundary

use thiserror::Error;

/// Errors reported by a [`NodeApi`](crate::infrastructure::traits::NodeApi) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("remote node not found: {0}")]
    NotFound(String),

    #[error("remote store rejected request: {message}")]
    Rejected { message: String },

    #[error("remote store unavailable: {message}")]
    Unavailable { message: String },
}

impl ApiError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Result type for remote API calls.
pub type ApiResult<T> = Result<T, ApiError>;
