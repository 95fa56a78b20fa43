//! Background sweep of expired in-memory codes
//!
//! Expiry is enforced lazily by the verification service; the sweeper only
//! reclaims memory for entries nobody came back to verify.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use dragon_shared::config::CacheConfig;

use super::InMemoryCodeStore;

/// Configuration for the sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// How long past expiry an entry is kept (in seconds)
    pub grace_seconds: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            grace_seconds: 300,
        }
    }
}

impl From<&CacheConfig> for SweeperConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            interval_seconds: config.sweep_interval_seconds,
            grace_seconds: config.expired_grace_seconds,
        }
    }
}

/// Periodically purges expired entries from an [`InMemoryCodeStore`]
pub struct CodeSweeper {
    store: Arc<InMemoryCodeStore>,
    config: SweeperConfig,
}

impl CodeSweeper {
    pub fn new(store: Arc<InMemoryCodeStore>, config: SweeperConfig) -> Self {
        Self { store, config }
    }

    /// Run a single sweep, returning how many entries were dropped
    pub fn run_once(&self) -> usize {
        let grace = Duration::seconds(self.config.grace_seconds as i64);
        self.store.purge_expired(Utc::now(), grace)
    }

    /// Spawn the sweep loop on the tokio runtime
    ///
    /// Returns `None` when the interval is zero (sweeping disabled).
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if self.config.interval_seconds == 0 {
            warn!("Code sweeper is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Code sweeper started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;
                let purged = self.run_once();
                if purged > 0 {
                    info!(purged, event = "codes_swept", "Swept expired verification codes");
                }
            }
        }))
    }
}
