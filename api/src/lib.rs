//! HTTP surface of the Dragon verification-code service
//!
//! Library exports for the binary and the route tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState, DynVerificationService};
