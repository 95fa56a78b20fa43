//! Shared utilities and common types for the Dragon server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (phone validation, masking)
//! - Language and response types

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Charset, CodeConfig, CodeStoreBackend, CountryPrefix, Environment,
    LogFormat, LoggingConfig, ServerConfig, SmsConfig, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{ApiResponse, HealthResponse, HealthStatus, Language, ServiceHealth};
pub use utils::phone;
