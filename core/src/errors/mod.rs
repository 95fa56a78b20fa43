//! Domain-specific error types and error handling.

mod types;

pub use types::VerificationError;

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl DomainError {
    /// The verification failure, if this is one
    pub fn as_verification(&self) -> Option<&VerificationError> {
        match self {
            DomainError::Verification(err) => Some(err),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
