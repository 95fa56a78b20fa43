//! Challenge identity value objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::VerificationError;

/// Kind of one-time code, selecting generator and delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    /// Numeric code delivered by SMS, keyed by mobile number
    Sms,
    /// Alphanumeric code rendered as an image, keyed by session identifier
    Image,
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeKind::Sms => write!(f, "sms"),
            ChallengeKind::Image => write!(f, "image"),
        }
    }
}

/// Identifier a one-time code is bound to
///
/// Non-empty, no whitespace, at most [`ChallengeKey::MAX_LEN`] bytes.
/// Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChallengeKey(String);

impl ChallengeKey {
    /// Longest key accepted
    pub const MAX_LEN: usize = 128;

    /// Prefix of generated image session keys
    pub const IMAGE_SESSION_PREFIX: &'static str = "image:";

    /// Validate a raw key
    pub fn parse(raw: &str) -> Result<Self, VerificationError> {
        if raw.is_empty() || raw.len() > Self::MAX_LEN || raw.chars().any(char::is_whitespace) {
            return Err(VerificationError::InvalidKeyFormat);
        }
        Ok(Self(raw.to_string()))
    }

    /// Fresh session key for an image challenge
    pub fn image_session() -> Self {
        Self(format!("{}{}", Self::IMAGE_SESSION_PREFIX, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ChallengeKey {
    type Error = VerificationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChallengeKey> for String {
    fn from(key: ChallengeKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ChallengeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChallengeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
