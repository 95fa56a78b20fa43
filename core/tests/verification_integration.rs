//! Integration tests for the verification service through its public API

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use dragon_core::domain::{ChallengeKey, VerificationCode};
    use dragon_core::errors::{DomainError, VerificationError};
    use dragon_core::services::verification::{
        CodeStore, ImageRenderer, ManualClock, RenderedImage, SmsSender, VerificationService,
        VerificationServiceConfig,
    };

    // Store backed by a tokio RwLock with per-entry attempt tracking
    struct SharedStore {
        codes: tokio::sync::RwLock<HashMap<String, (VerificationCode, u32)>>,
    }

    impl SharedStore {
        fn new() -> Self {
            Self {
                codes: tokio::sync::RwLock::new(HashMap::new()),
            }
        }

        async fn value(&self, key: &str) -> Option<String> {
            self.codes.read().await.get(key).map(|(c, _)| c.value.clone())
        }
    }

    #[async_trait]
    impl CodeStore for SharedStore {
        async fn put(&self, code: VerificationCode) -> Result<(), String> {
            self.codes.write().await.insert(code.key.to_string(), (code, 0));
            Ok(())
        }

        async fn get(&self, key: &ChallengeKey) -> Result<Option<VerificationCode>, String> {
            Ok(self.codes.read().await.get(key.as_str()).map(|(c, _)| c.clone()))
        }

        async fn remove(&self, key: &ChallengeKey) -> Result<(), String> {
            self.codes.write().await.remove(key.as_str());
            Ok(())
        }

        async fn remove_if_current(&self, key: &ChallengeKey, code_id: Uuid) -> Result<bool, String> {
            let mut codes = self.codes.write().await;
            if codes.get(key.as_str()).map(|(c, _)| c.id) == Some(code_id) {
                codes.remove(key.as_str());
                return Ok(true);
            }
            Ok(false)
        }

        async fn record_failed_attempt(&self, key: &ChallengeKey, code_id: Uuid) -> Result<Option<u32>, String> {
            let mut codes = self.codes.write().await;
            Ok(match codes.get_mut(key.as_str()) {
                Some((c, attempts)) if c.id == code_id => {
                    *attempts += 1;
                    Some(*attempts)
                }
                _ => None,
            })
        }
    }

    struct CountingSms {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl SmsSender for CountingSms {
        async fn send(&self, _recipient: &str, _code: &VerificationCode) -> Result<String, String> {
            let n = self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(format!("msg_{}", n))
        }
    }

    struct PlainRenderer;

    impl ImageRenderer for PlainRenderer {
        fn render(&self, text: &str) -> Result<RenderedImage, String> {
            Ok(RenderedImage::new("text/plain", text.as_bytes().to_vec()))
        }
    }

    type Service = VerificationService<SharedStore, CountingSms, PlainRenderer>;

    fn build(config: VerificationServiceConfig) -> (Arc<Service>, Arc<SharedStore>, Arc<ManualClock>) {
        let store = Arc::new(SharedStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = VerificationService::new(
            store.clone(),
            Arc::new(CountingSms {
                sent: AtomicUsize::new(0),
            }),
            Arc::new(PlainRenderer),
            config,
        )
        .unwrap()
        .with_clock(clock.clone());
        (Arc::new(service), store, clock)
    }

    fn reason(err: DomainError) -> VerificationError {
        err.as_verification().cloned().expect("verification error")
    }

    #[tokio::test]
    async fn test_sms_lifecycle_with_default_config() {
        let (service, store, clock) = build(VerificationServiceConfig::default());

        let challenge = service.issue_sms_challenge("8613800000000").await.unwrap();
        assert_eq!(challenge.message_id, "msg_0");
        let code = store.value("8613800000000").await.unwrap();
        assert_eq!(code.len(), 6);

        clock.advance(Duration::seconds(60));
        service.verify("8613800000000", &code).await.unwrap();

        let err = service.verify("8613800000000", &code).await.unwrap_err();
        assert_eq!(reason(err), VerificationError::NoSuchChallenge);
    }

    #[tokio::test]
    async fn test_sms_code_expires_after_ttl() {
        let (service, store, clock) = build(VerificationServiceConfig::default());

        service.issue_sms_challenge("8613800000000").await.unwrap();
        let code = store.value("8613800000000").await.unwrap();

        clock.advance(Duration::seconds(120));
        let err = service.verify("8613800000000", &code).await.unwrap_err();
        assert_eq!(reason(err), VerificationError::Expired);
    }

    #[tokio::test]
    async fn test_unsupported_country_creates_nothing() {
        let (service, store, _) = build(VerificationServiceConfig::default());

        let err = service.issue_sms_challenge("1234").await.unwrap_err();
        assert_eq!(reason(err), VerificationError::InvalidCountry);
        assert!(store.value("1234").await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_verifications_consume_once() {
        let (service, store, _) = build(VerificationServiceConfig::default());

        service.issue_sms_challenge("8613800000000").await.unwrap();
        let code = store.value("8613800000000").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                service.verify("8613800000000", &code).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert_eq!(reason(err), VerificationError::NoSuchChallenge),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_keys_are_independent() {
        let (service, store, _) = build(VerificationServiceConfig::default());

        let mobiles: Vec<String> = (0..20).map(|i| format!("86138000000{:02}", i)).collect();
        for mobile in &mobiles {
            service.issue_sms_challenge(mobile).await.unwrap();
        }

        let mut handles = Vec::new();
        for mobile in mobiles {
            let service = service.clone();
            let code = store.value(&mobile).await.unwrap();
            handles.push(tokio::spawn(async move { service.verify(&mobile, &code).await }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }

    #[tokio::test]
    async fn test_attempt_cap_through_public_api() {
        let config = VerificationServiceConfig {
            max_failed_attempts: Some(2),
            ..VerificationServiceConfig::default()
        };
        let (service, store, _) = build(config);

        let challenge = service.issue_image_challenge().await.unwrap();
        let key = challenge.key.as_str();
        let code = store.value(key).await.unwrap();

        for _ in 0..2 {
            let err = service.verify(key, "!!!!").await.unwrap_err();
            assert_eq!(reason(err), VerificationError::Mismatch);
        }

        let err = service.verify(key, &code).await.unwrap_err();
        assert_eq!(reason(err), VerificationError::NoSuchChallenge);
    }
}
