//! Verification code workflow
//!
//! This module provides:
//! - Code generation per challenge kind
//! - Storage behind the `CodeStore` trait
//! - Delivery through SMS and image sinks
//! - The issue/verify state machine

mod clock;
mod config;
mod dispatcher;
mod generator;
mod service;
mod traits;
mod types;


pub use clock::{Clock, ManualClock, SystemClock};
pub use config::VerificationServiceConfig;
pub use dispatcher::CodeDispatcher;
pub use generator::{CodeGenerator, CodeGenerators};
pub use service::VerificationService;
pub use traits::{CodeStore, ImageRenderer, SmsSender};
pub use types::{
    Delivery, ImageChallenge, IssuedChallenge, RenderedImage, SmsChallenge, VerifiedChallenge,
};
