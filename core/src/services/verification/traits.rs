//! Traits for the code store and delivery sinks

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::ChallengeKey;

use super::types::RenderedImage;

/// Keyed storage of outstanding codes
///
/// Absence is a normal `Ok(None)`/`Ok(false)`; `Err` is reserved for backend
/// failures. Every operation is atomic per key.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store a code under its key, replacing any previous entry and its attempt count
    async fn put(&self, code: VerificationCode) -> Result<(), String>;

    /// Fetch the entry for a key, expired or not
    async fn get(&self, key: &ChallengeKey) -> Result<Option<VerificationCode>, String>;

    /// Delete the entry for a key; deleting a missing key is not an error
    async fn remove(&self, key: &ChallengeKey) -> Result<(), String>;

    /// Delete the entry only if it is still the issuance `code_id`
    async fn remove_if_current(&self, key: &ChallengeKey, code_id: Uuid) -> Result<bool, String>;

    /// Count a wrong submission against issuance `code_id`
    ///
    /// Returns the new count, or `None` if that issuance is no longer stored.
    async fn record_failed_attempt(&self, key: &ChallengeKey, code_id: Uuid) -> Result<Option<u32>, String>;
}

/// Outbound SMS channel
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send the code to a mobile number, returning the provider's message id
    async fn send(&self, recipient: &str, code: &VerificationCode) -> Result<String, String>;
}

/// Turns code text into an image
pub trait ImageRenderer: Send + Sync {
    fn render(&self, text: &str) -> Result<RenderedImage, String>;
}
