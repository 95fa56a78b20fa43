//! Types for verification service results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{ChallengeKey, ChallengeKind};

/// Image produced for a visual code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// MIME type, e.g. `image/svg+xml`
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// How a freshly stored code reached its recipient
#[derive(Debug, Clone)]
pub enum Delivery {
    /// SMS accepted by the provider
    Sms { message_id: String },
    /// Image ready to hand back to the caller
    Image(RenderedImage),
}

/// Result of issuing a code
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    /// The stored code
    pub code: VerificationCode,
    pub delivery: Delivery,
}

/// Result of issuing an image code
#[derive(Debug, Clone)]
pub struct ImageChallenge {
    /// Session key the client must echo back on verify
    pub key: ChallengeKey,
    pub image: RenderedImage,
    pub expires_at: DateTime<Utc>,
}

/// Result of issuing an SMS code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsChallenge {
    pub key: ChallengeKey,
    /// Provider message id
    pub message_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Successful verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedChallenge {
    pub key: ChallengeKey,
    pub kind: ChallengeKind,
    pub verified_at: DateTime<Utc>,
}
