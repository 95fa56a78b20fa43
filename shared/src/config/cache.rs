//! Code store configuration module

use serde::{Deserialize, Serialize};

/// Backend used to hold issued verification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodeStoreBackend {
    /// Process-local sharded map
    #[default]
    Memory,
    /// Redis, shared between processes
    Redis,
}

impl std::str::FromStr for CodeStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(CodeStoreBackend::Memory),
            "redis" => Ok(CodeStoreBackend::Redis),
            _ => Err(format!("Invalid code store backend: {}", s)),
        }
    }
}

/// Code store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Which backend holds the codes
    #[serde(default)]
    pub backend: CodeStoreBackend,

    /// Redis connection URL (only used by the redis backend)
    pub url: String,

    /// Key prefix for redis entries
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Number of shards for the in-memory backend
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Seconds an expired entry is retained so it can still be reported as expired
    #[serde(default = "default_expired_grace_seconds")]
    pub expired_grace_seconds: u64,

    /// Interval of the background sweep in seconds (0 disables it)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CodeStoreBackend::Memory,
            url: String::from("redis://localhost:6379"),
            key_prefix: default_key_prefix(),
            shards: default_shards(),
            expired_grace_seconds: default_expired_grace_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: std::env::var("CODE_STORE")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.backend),
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            shards: std::env::var("CODE_STORE_SHARDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|s: &usize| *s > 0)
                .unwrap_or(defaults.shards),
            expired_grace_seconds: std::env::var("EXPIRED_GRACE_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expired_grace_seconds),
            sweep_interval_seconds: std::env::var("SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sweep_interval_seconds),
        }
    }

    /// Create a new redis-backed configuration with URL
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CodeStoreBackend::Redis,
            url: url.into(),
            ..Default::default()
        }
    }
}

fn default_key_prefix() -> String {
    String::from("verification")
}

fn default_shards() -> usize {
    16
}

fn default_expired_grace_seconds() -> u64 {
    300
}

fn default_sweep_interval_seconds() -> u64 {
    60
}
