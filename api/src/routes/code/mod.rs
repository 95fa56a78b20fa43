//! Verification code endpoints under `/dragon/code`

pub mod image;
pub mod sms;
pub mod verify;

/// Response header carrying the image session key
pub const CHALLENGE_KEY_HEADER: &str = "x-challenge-key";
