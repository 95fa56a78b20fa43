//! # Dragon Core
//!
//! Core business logic for the Dragon verification-code backend.
//! This crate contains the code entity, challenge value objects, the
//! verification service with its store and delivery traits, and error types.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
