//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent input that cannot be turned into an org tree.
/// Structural anomalies (cycles, odd FTE values) are not errors; they are
/// reported as advisory issues by the validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid role {id:?}: {message}")]
    InvalidRole { id: String, message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
