//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the verification service
//! depends on.
//!
//! ## Architecture
//!
//! - **Cache**: in-memory sharded code store, Redis code store, expired-entry sweeper
//! - **SMS**: mock sender and HTTP gateway sender
//! - **Image**: SVG renderer for visual codes
//!
//! ## Features
//!
//! - `redis-cache`: Enable the Redis code store (default)

/// Cache module - code store backends
pub mod cache;

/// SMS module - outbound SMS senders
pub mod sms;

/// Image module - code image rendering
pub mod image;

pub use cache::{create_code_store, CodeSweeper, ConfiguredStore, InMemoryCodeStore, SweeperConfig};
pub use image::SvgImageRenderer;
pub use sms::{create_sms_sender, HttpSmsGateway, MockSmsSender};

#[cfg(feature = "redis-cache")]
pub use cache::{RedisClient, RedisCodeStore};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored entry could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// Image rendering error
    #[error("Image rendering error: {0}")]
    Render(String),
}
