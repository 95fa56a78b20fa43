//! Request and response DTOs for the verification code endpoints

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use dragon_core::domain::ChallengeKind;
use dragon_core::services::verification::{ImageChallenge, SmsChallenge, VerifiedChallenge};

/// Query for `GET /dragon/code/sms`
#[derive(Debug, Deserialize, Validate)]
pub struct SmsCodeQuery {
    /// Mobile number with country prefix, digits only (e.g. `8613800000000`)
    #[validate(length(max = 32, message = "Mobile number is too long"))]
    pub mobile: String,
}

/// How the image code is returned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Raw image bytes, key in the `X-Challenge-Key` header
    #[default]
    Raw,
    /// JSON envelope with a base64 data URI
    Json,
}

/// Query for `GET /dragon/code/image`
#[derive(Debug, Default, Deserialize)]
pub struct ImageCodeQuery {
    #[serde(default)]
    pub format: ImageFormat,
}

/// Body for `POST /dragon/code/verify`
///
/// Any key or code shape is accepted; the service reports unknown keys and
/// wrong codes as verification outcomes.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    /// Challenge key: the mobile number or the image session key
    pub key: String,

    /// Code typed by the user
    #[serde(default)]
    pub code: String,
}

/// Data returned after an SMS code was sent
#[derive(Debug, Serialize, Deserialize)]
pub struct SmsCodeResponse {
    pub key: String,
    pub message_id: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds until the code expires
    pub expires_in: i64,
}

impl SmsCodeResponse {
    pub fn from_challenge(challenge: SmsChallenge, now: DateTime<Utc>) -> Self {
        Self {
            key: challenge.key.into_inner(),
            message_id: challenge.message_id,
            expires_in: (challenge.expires_at - now).num_seconds().max(0),
            expires_at: challenge.expires_at,
        }
    }
}

/// JSON rendition of an image code
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageCodeResponse {
    pub key: String,
    pub content_type: String,
    /// `data:{content_type};base64,...`
    pub image: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

impl ImageCodeResponse {
    pub fn from_challenge(challenge: &ImageChallenge, now: DateTime<Utc>) -> Self {
        let content_type = challenge.image.content_type.clone();
        Self {
            key: challenge.key.to_string(),
            image: format!("data:{};base64,{}", content_type, STANDARD.encode(&challenge.image.bytes)),
            content_type,
            expires_at: challenge.expires_at,
            expires_in: (challenge.expires_at - now).num_seconds().max(0),
        }
    }
}

/// Data returned after a successful verification
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub key: String,
    pub kind: ChallengeKind,
    pub verified_at: DateTime<Utc>,
}

impl From<VerifiedChallenge> for VerifyCodeResponse {
    fn from(verified: VerifiedChallenge) -> Self {
        Self {
            key: verified.key.into_inner(),
            kind: verified.kind,
            verified_at: verified.verified_at,
        }
    }
}
