//! Code store backends
//!
//! - `memory` - sharded in-process store (default)
//! - `redis` - Redis store for multi-instance deployments
//! - `sweeper` - background purge of expired in-memory entries

pub mod memory_code_store;
pub mod sweeper;

#[cfg(feature = "redis-cache")]
pub mod redis_client;
#[cfg(feature = "redis-cache")]
pub mod redis_code_store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use dragon_core::services::CodeStore;
use dragon_shared::config::{CacheConfig, CodeStoreBackend};

use crate::InfrastructureError;

pub use memory_code_store::InMemoryCodeStore;
pub use sweeper::{CodeSweeper, SweeperConfig};

#[cfg(feature = "redis-cache")]
pub use redis_client::RedisClient;
#[cfg(feature = "redis-cache")]
pub use redis_code_store::RedisCodeStore;

/// Store selected by configuration
///
/// The in-memory store is also returned concretely so the caller can attach
/// a sweeper to it.
pub enum ConfiguredStore {
    Memory(Arc<InMemoryCodeStore>),
    #[cfg(feature = "redis-cache")]
    Redis(Arc<RedisCodeStore>),
}

impl ConfiguredStore {
    pub fn as_code_store(&self) -> Arc<dyn CodeStore> {
        match self {
            ConfiguredStore::Memory(store) => store.clone(),
            #[cfg(feature = "redis-cache")]
            ConfiguredStore::Redis(store) => store.clone(),
        }
    }
}

/// Create the code store named by the configuration
pub async fn create_code_store(config: &CacheConfig) -> Result<ConfiguredStore, InfrastructureError> {
    match config.backend {
        CodeStoreBackend::Memory => {
            tracing::info!(shards = config.shards, "Using in-memory code store");
            Ok(ConfiguredStore::Memory(Arc::new(InMemoryCodeStore::from_config(config))))
        }
        #[cfg(feature = "redis-cache")]
        CodeStoreBackend::Redis => {
            tracing::info!("Using Redis code store");
            Ok(ConfiguredStore::Redis(Arc::new(RedisCodeStore::connect(config).await?)))
        }
        #[cfg(not(feature = "redis-cache"))]
        CodeStoreBackend::Redis => Err(InfrastructureError::Config(
            "Redis code store requires the redis-cache feature".to_string(),
        )),
    }
}
