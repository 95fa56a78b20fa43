//! Redis-backed code store
//!
//! Key patterns (prefix defaults to `verification`):
//! - `{prefix}:code:{key}` - JSON encoded code, Redis TTL of code ttl + grace
//! - `{prefix}:attempts:{key}` - failed attempt counter for the current code
//!
//! Writes that must be atomic with a read run as Lua scripts so concurrent
//! verifies across processes cannot both consume one code.

use async_trait::async_trait;
use redis::Script;
use tracing::debug;
use uuid::Uuid;

use dragon_core::domain::{ChallengeKey, VerificationCode};
use dragon_core::services::CodeStore;
use dragon_shared::config::CacheConfig;

use super::RedisClient;
use crate::InfrastructureError;

/// Lua scripts used by the store
struct Scripts {
    put: Script,
    remove_if_current: Script,
    record_failed_attempt: Script,
}

impl Scripts {
    fn load() -> Self {
        Self {
            put: Script::new(
                r"
                redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
                redis.call('DEL', KEYS[2])
                return 1
                ",
            ),
            remove_if_current: Script::new(
                r"
                local raw = redis.call('GET', KEYS[1])
                if not raw then return 0 end
                if cjson.decode(raw)['id'] ~= ARGV[1] then return 0 end
                redis.call('DEL', KEYS[1], KEYS[2])
                return 1
                ",
            ),
            record_failed_attempt: Script::new(
                r"
                local raw = redis.call('GET', KEYS[1])
                if not raw then return -1 end
                if cjson.decode(raw)['id'] ~= ARGV[1] then return -1 end
                local count = redis.call('INCR', KEYS[2])
                if count == 1 then
                    local ttl = redis.call('TTL', KEYS[1])
                    if ttl > 0 then redis.call('EXPIRE', KEYS[2], ttl) end
                end
                return count
                ",
            ),
        }
    }
}

/// [`CodeStore`] persisted in Redis
pub struct RedisCodeStore {
    client: RedisClient,
    key_prefix: String,
    grace_seconds: u64,
    scripts: Scripts,
}

impl RedisCodeStore {
    pub fn new(client: RedisClient, key_prefix: impl Into<String>, grace_seconds: u64) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            grace_seconds,
            scripts: Scripts::load(),
        }
    }

    /// Connect using the cache configuration
    pub async fn connect(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        let client = RedisClient::new(&config.url).await?;
        Ok(Self::new(
            client,
            config.key_prefix.clone(),
            config.expired_grace_seconds,
        ))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    pub(crate) fn code_key(&self, key: &ChallengeKey) -> String {
        format!("{}:code:{}", self.key_prefix, key)
    }

    pub(crate) fn attempts_key(&self, key: &ChallengeKey) -> String {
        format!("{}:attempts:{}", self.key_prefix, key)
    }

    /// Redis TTL for a code: its lifetime plus the grace window
    pub(crate) fn storage_ttl(&self, code: &VerificationCode) -> u64 {
        code.ttl().num_seconds().max(1) as u64 + self.grace_seconds
    }
}

fn store_error(e: impl std::fmt::Display) -> String {
    e.to_string()
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn put(&self, code: VerificationCode) -> Result<(), String> {
        let payload = serde_json::to_string(&code).map_err(store_error)?;
        let ttl = self.storage_ttl(&code).to_string();
        let (code_key, attempts_key) = (self.code_key(&code.key), self.attempts_key(&code.key));

        self.client
            .eval_int(&self.scripts.put, &[&code_key, &attempts_key], &[&payload, &ttl])
            .await
            .map_err(store_error)?;

        debug!(code_id = %code.id, ttl = %ttl, "Stored verification code in Redis");
        Ok(())
    }

    async fn get(&self, key: &ChallengeKey) -> Result<Option<VerificationCode>, String> {
        let raw = self.client.get(&self.code_key(key)).await.map_err(store_error)?;
        raw.map(|payload| serde_json::from_str(&payload).map_err(store_error))
            .transpose()
    }

    async fn remove(&self, key: &ChallengeKey) -> Result<(), String> {
        let (code_key, attempts_key) = (self.code_key(key), self.attempts_key(key));
        self.client
            .delete(&[&code_key, &attempts_key])
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn remove_if_current(&self, key: &ChallengeKey, code_id: Uuid) -> Result<bool, String> {
        let (code_key, attempts_key) = (self.code_key(key), self.attempts_key(key));
        let removed = self
            .client
            .eval_int_once(
                &self.scripts.remove_if_current,
                &[&code_key, &attempts_key],
                &[&code_id.to_string()],
            )
            .await
            .map_err(store_error)?;
        Ok(removed == 1)
    }

    async fn record_failed_attempt(&self, key: &ChallengeKey, code_id: Uuid) -> Result<Option<u32>, String> {
        let (code_key, attempts_key) = (self.code_key(key), self.attempts_key(key));
        let count = self
            .client
            .eval_int_once(
                &self.scripts.record_failed_attempt,
                &[&code_key, &attempts_key],
                &[&code_id.to_string()],
            )
            .await
            .map_err(store_error)?;
        Ok(u32::try_from(count).ok())
    }
}
