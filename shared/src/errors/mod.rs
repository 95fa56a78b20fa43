//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message (localized)
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned to clients
pub mod error_codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_COUNTRY: &str = "INVALID_COUNTRY";
    pub const INVALID_KEY_FORMAT: &str = "INVALID_KEY_FORMAT";
    pub const NO_SUCH_CHALLENGE: &str = "NO_SUCH_CHALLENGE";
    pub const CODE_EXPIRED: &str = "CODE_EXPIRED";
    pub const CODE_MISMATCH: &str = "CODE_MISMATCH";
    pub const EMPTY_SUBMISSION: &str = "EMPTY_SUBMISSION";
    pub const DELIVERY_FAILED: &str = "DELIVERY_FAILED";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_detail() {
        let response = ErrorResponse::new(error_codes::DELIVERY_FAILED, "send failed")
            .add_detail("challenge_key", "8613800000000");

        let details = response.details.unwrap();
        assert_eq!(details["challenge_key"], serde_json::json!("8613800000000"));
    }
}
