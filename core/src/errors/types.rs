//! Verification error kinds
//!
//! Messages here are for logs; user-facing text is chosen by the
//! presentation layer from the variant.

use thiserror::Error;

/// Reasons an issue or verify call can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Mobile number belongs to an unsupported country")]
    InvalidCountry,

    #[error("Challenge key has an invalid format")]
    InvalidKeyFormat,

    #[error("No outstanding code for this key")]
    NoSuchChallenge,

    #[error("Verification code expired")]
    Expired,

    #[error("Verification code does not match")]
    Mismatch,

    #[error("Submitted code is empty")]
    EmptySubmission,

    #[error("Code delivery failed for {key}: {reason}")]
    DeliveryFailed { key: String, reason: String },
}

impl VerificationError {
    /// Stable identifier used in logs and error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::InvalidCountry => "invalid_country",
            VerificationError::InvalidKeyFormat => "invalid_key_format",
            VerificationError::NoSuchChallenge => "no_such_challenge",
            VerificationError::Expired => "expired",
            VerificationError::Mismatch => "mismatch",
            VerificationError::EmptySubmission => "empty_submission",
            VerificationError::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}
