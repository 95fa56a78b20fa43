//! In-process code store
//!
//! Entries live in a fixed number of shards, each behind its own mutex.
//! A key always maps to the same shard, so per-key operations are atomic
//! and keys in different shards never contend. No lock is held across an
//! await point.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use dragon_core::domain::{ChallengeKey, VerificationCode};
use dragon_core::services::CodeStore;
use dragon_shared::config::CacheConfig;

/// Default number of shards
pub const DEFAULT_SHARDS: usize = 16;

#[derive(Debug, Clone)]
struct StoredEntry {
    code: VerificationCode,
    failed_attempts: u32,
}

type Shard = HashMap<ChallengeKey, StoredEntry>;

/// Sharded in-memory [`CodeStore`]
pub struct InMemoryCodeStore {
    shards: Vec<Mutex<Shard>>,
}

impl InMemoryCodeStore {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a store with `shards` partitions (at least one)
    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_shards(config.shards)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| lock(shard).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose `expires_at + grace` is at or before `now`
    ///
    /// Entries inside the grace window are kept so a late verify still
    /// observes "expired" rather than "no such challenge".
    pub fn purge_expired(&self, now: DateTime<Utc>, grace: Duration) -> usize {
        let mut purged = 0;
        for shard in &self.shards {
            let mut entries = lock(shard);
            let before = entries.len();
            entries.retain(|_, entry| entry.code.expires_at + grace > now);
            purged += before - entries.len();
        }
        if purged > 0 {
            debug!(purged, "Purged expired verification codes");
        }
        purged
    }

    fn shard(&self, key: &ChallengeKey) -> &Mutex<Shard> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}

impl Default for InMemoryCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(shard: &Mutex<Shard>) -> MutexGuard<'_, Shard> {
    shard.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn put(&self, code: VerificationCode) -> Result<(), String> {
        let key = code.key.clone();
        lock(self.shard(&key)).insert(
            key,
            StoredEntry {
                code,
                failed_attempts: 0,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &ChallengeKey) -> Result<Option<VerificationCode>, String> {
        Ok(lock(self.shard(key)).get(key).map(|entry| entry.code.clone()))
    }

    async fn remove(&self, key: &ChallengeKey) -> Result<(), String> {
        lock(self.shard(key)).remove(key);
        Ok(())
    }

    async fn remove_if_current(&self, key: &ChallengeKey, code_id: Uuid) -> Result<bool, String> {
        let mut entries = lock(self.shard(key));
        match entries.get(key) {
            Some(entry) if entry.code.id == code_id => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_failed_attempt(&self, key: &ChallengeKey, code_id: Uuid) -> Result<Option<u32>, String> {
        let mut entries = lock(self.shard(key));
        Ok(entries
            .get_mut(key)
            .filter(|entry| entry.code.id == code_id)
            .map(|entry| {
                entry.failed_attempts += 1;
                entry.failed_attempts
            }))
    }
}
