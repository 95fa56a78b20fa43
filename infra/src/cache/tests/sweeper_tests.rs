//! Unit tests for the code sweeper

use chrono::{Duration, Utc};
use std::sync::Arc;

use dragon_core::domain::{ChallengeKey, ChallengeKind, VerificationCode};
use dragon_core::services::CodeStore;
use dragon_shared::config::CacheConfig;

use crate::cache::{CodeSweeper, InMemoryCodeStore, SweeperConfig};

fn expired_code(key: &str, seconds_ago: i64) -> VerificationCode {
    let mut code = VerificationCode::new(
        ChallengeKey::parse(key).unwrap(),
        ChallengeKind::Image,
        "aB3x".to_string(),
        Utc::now() - Duration::seconds(seconds_ago + 60),
        60,
    );
    code.expires_at = Utc::now() - Duration::seconds(seconds_ago);
    code
}

#[tokio::test]
async fn test_run_once_purges_past_grace() {
    let store = Arc::new(InMemoryCodeStore::new());
    store.put(expired_code("image:old", 1000)).await.unwrap();
    store.put(expired_code("image:recent", 10)).await.unwrap();

    let sweeper = CodeSweeper::new(
        store.clone(),
        SweeperConfig {
            interval_seconds: 60,
            grace_seconds: 300,
        },
    );

    assert_eq!(sweeper.run_once(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_disabled_sweeper_does_not_spawn() {
    let sweeper = Arc::new(CodeSweeper::new(
        Arc::new(InMemoryCodeStore::new()),
        SweeperConfig {
            interval_seconds: 0,
            grace_seconds: 300,
        },
    ));
    assert!(sweeper.start_background_task().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_background_task_sweeps() {
    let store = Arc::new(InMemoryCodeStore::new());
    store.put(expired_code("image:old", 1000)).await.unwrap();

    let sweeper = Arc::new(CodeSweeper::new(store.clone(), SweeperConfig::default()));
    let handle = sweeper.start_background_task().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(store.is_empty());
    handle.abort();
}

#[test]
fn test_config_from_cache_config() {
    let config = SweeperConfig::from(&CacheConfig::default());
    assert_eq!(config.interval_seconds, 60);
    assert_eq!(config.grace_seconds, 300);
}
