//! Verification code entity bound to a challenge key.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ChallengeKey, ChallengeKind};

/// One outstanding one-time code
///
/// At most one exists per key. A code is live while `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Identity of this particular issuance, used for compare-and-remove
    pub id: Uuid,

    /// Key the code is bound to (mobile number or image session id)
    pub key: ChallengeKey,

    /// Kind of challenge that produced the code
    pub kind: ChallengeKind,

    /// The code text
    pub value: String,

    /// Timestamp when the code was created
    pub created_at: DateTime<Utc>,

    /// Timestamp from which the code is no longer accepted
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Creates a code issued at `now` and valid for `ttl_seconds`
    ///
    /// # Arguments
    ///
    /// * `key` - Challenge key the code is bound to
    /// * `kind` - SMS or image
    /// * `value` - Generated code text
    /// * `now` - Issuance instant
    /// * `ttl_seconds` - Lifetime in seconds
    pub fn new(
        key: ChallengeKey,
        kind: ChallengeKind,
        value: String,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            kind,
            value,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
        }
    }

    /// Whether the code has expired at the given instant
    ///
    /// Expiry is inclusive: a code is rejected at exactly `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Exact, case-sensitive comparison in constant time
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.value.as_bytes(), submitted.as_bytes())
    }

    /// Remaining lifetime, zero once expired
    pub fn time_until_expiration_at(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired_at(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }

    /// Lifetime as issued
    pub fn ttl(&self) -> Duration {
        self.expires_at - self.created_at
    }
}
