//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("remote call failed: {context}")]
    Remote {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("tree not registered: {0}")]
    UnknownTree(String),

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    pub fn remote(context: impl Into<String>, source: ApiError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
