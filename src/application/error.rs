//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("failed to build org chart: {0}")]
    Build(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("export to {format} failed: {message}")]
    Export { format: String, message: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
