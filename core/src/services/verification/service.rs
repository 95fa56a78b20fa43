//! Main verification service implementation

use std::sync::Arc;

use dragon_shared::utils::phone::{is_numeric_mobile, mask_phone_number};

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{ChallengeKey, ChallengeKind};
use crate::errors::{DomainError, DomainResult, VerificationError};

use super::clock::{Clock, SystemClock};
use super::config::VerificationServiceConfig;
use super::dispatcher::CodeDispatcher;
use super::generator::CodeGenerators;
use super::traits::{CodeStore, ImageRenderer, SmsSender};
use super::types::{Delivery, ImageChallenge, IssuedChallenge, SmsChallenge, VerifiedChallenge};

/// Issues one-time codes and checks submissions against them
///
/// The store is the only shared state. Terminal outcomes go through
/// `remove_if_current` so a code is consumed at most once and a verify
/// never deletes a newer re-issued code.
pub struct VerificationService<C, S, R>
where
    C: CodeStore + ?Sized,
    S: SmsSender + ?Sized,
    R: ImageRenderer + ?Sized,
{
    store: Arc<C>,
    dispatcher: CodeDispatcher<S, R>,
    generators: CodeGenerators,
    config: VerificationServiceConfig,
    clock: Arc<dyn Clock>,
}

impl<C, S, R> VerificationService<C, S, R>
where
    C: CodeStore + ?Sized,
    S: SmsSender + ?Sized,
    R: ImageRenderer + ?Sized,
{
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `store` - Code store implementation
    /// * `sms_sender` - SMS delivery sink
    /// * `image_renderer` - Image delivery sink
    /// * `config` - Service configuration
    ///
    /// Fails if either code configuration cannot produce a usable code.
    pub fn new(
        store: Arc<C>,
        sms_sender: Arc<S>,
        image_renderer: Arc<R>,
        config: VerificationServiceConfig,
    ) -> DomainResult<Self> {
        let generators = CodeGenerators::new(config.sms.clone(), config.image.clone())?;

        Ok(Self {
            store,
            dispatcher: CodeDispatcher::new(sms_sender, image_renderer),
            generators,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a code of `kind` for `raw_key`
    ///
    /// The code is stored before delivery. A delivery failure is reported as
    /// `DeliveryFailed` and leaves the stored code verifiable.
    pub async fn issue(&self, raw_key: &str, kind: ChallengeKind) -> DomainResult<IssuedChallenge> {
        let key = self.check_key(raw_key, kind)?;
        let code = self
            .generators
            .for_kind(kind)
            .generate(key, kind, self.clock.now());

        self.store.put(code.clone()).await.map_err(|e| {
            tracing::error!(
                key = %Self::log_key(&code.key, kind),
                kind = %kind,
                error = %e,
                event = "code_storage_failed",
                "Failed to store verification code"
            );
            DomainError::Internal {
                message: format!("Failed to store verification code: {}", e),
            }
        })?;

        tracing::info!(
            key = %Self::log_key(&code.key, kind),
            kind = %kind,
            code_id = %code.id,
            expires_at = %code.expires_at,
            event = "code_issued",
            "Issued verification code"
        );
        tracing::debug!(code_id = %code.id, value = %code.value, "Generated code value");

        let delivery = self.dispatcher.deliver(&code).await.map_err(|e| {
            tracing::warn!(
                key = %Self::log_key(&code.key, kind),
                kind = %kind,
                code_id = %code.id,
                error = %e,
                event = "code_delivery_failed",
                "Code stored but delivery failed"
            );
            e
        })?;

        Ok(IssuedChallenge { code, delivery })
    }

    /// Issue an SMS code for a mobile number
    pub async fn issue_sms_challenge(&self, mobile: &str) -> DomainResult<SmsChallenge> {
        let issued = self.issue(mobile.trim(), ChallengeKind::Sms).await?;
        match issued.delivery {
            Delivery::Sms { message_id } => Ok(SmsChallenge {
                key: issued.code.key,
                message_id,
                expires_at: issued.code.expires_at,
            }),
            Delivery::Image(_) => Err(DomainError::Internal {
                message: "SMS challenge produced an image delivery".to_string(),
            }),
        }
    }

    /// Issue an image code under a fresh session key
    pub async fn issue_image_challenge(&self) -> DomainResult<ImageChallenge> {
        let key = ChallengeKey::image_session();
        let issued = self.issue(key.as_str(), ChallengeKind::Image).await?;
        match issued.delivery {
            Delivery::Image(image) => Ok(ImageChallenge {
                key: issued.code.key,
                image,
                expires_at: issued.code.expires_at,
            }),
            Delivery::Sms { .. } => Err(DomainError::Internal {
                message: "Image challenge produced an SMS delivery".to_string(),
            }),
        }
    }

    /// Check a submitted code against the outstanding code for `raw_key`
    ///
    /// Outcomes, in evaluation order: blank submission, no entry, expired
    /// (entry removed), mismatch (entry kept unless the attempt cap is hit),
    /// success (entry consumed).
    pub async fn verify(&self, raw_key: &str, submitted: &str) -> DomainResult<VerifiedChallenge> {
        if submitted.trim().is_empty() {
            return Err(VerificationError::EmptySubmission.into());
        }

        let key = ChallengeKey::parse(raw_key).map_err(|_| VerificationError::NoSuchChallenge)?;
        let code = self
            .store
            .get(&key)
            .await
            .map_err(Self::store_error)?
            .ok_or(VerificationError::NoSuchChallenge)?;

        let now = self.clock.now();
        if code.is_expired_at(now) {
            self.store
                .remove_if_current(&key, code.id)
                .await
                .map_err(Self::store_error)?;
            tracing::info!(
                key = %Self::log_key(&key, code.kind),
                code_id = %code.id,
                event = "code_expired",
                "Verification code expired"
            );
            return Err(VerificationError::Expired.into());
        }

        if !code.matches(submitted) {
            self.record_mismatch(&code).await?;
            return Err(VerificationError::Mismatch.into());
        }

        let consumed = self
            .store
            .remove_if_current(&key, code.id)
            .await
            .map_err(Self::store_error)?;
        if !consumed {
            tracing::info!(
                key = %Self::log_key(&key, code.kind),
                code_id = %code.id,
                event = "code_already_consumed",
                "Code consumed or replaced concurrently"
            );
            return Err(VerificationError::NoSuchChallenge.into());
        }

        tracing::info!(
            key = %Self::log_key(&key, code.kind),
            kind = %code.kind,
            code_id = %code.id,
            event = "code_verified",
            "Verification code accepted"
        );

        Ok(VerifiedChallenge {
            key,
            kind: code.kind,
            verified_at: now,
        })
    }

    /// Validate a raw key for its kind; country is checked before shape
    fn check_key(&self, raw_key: &str, kind: ChallengeKind) -> Result<ChallengeKey, VerificationError> {
        if kind == ChallengeKind::Sms {
            if !self.config.country_prefixes.supports(raw_key) {
                tracing::warn!(
                    mobile = %mask_phone_number(raw_key),
                    event = "unsupported_country",
                    "Rejected SMS code request for unsupported country"
                );
                return Err(VerificationError::InvalidCountry);
            }
            if !is_numeric_mobile(raw_key, self.config.sms_key_length) {
                return Err(VerificationError::InvalidKeyFormat);
            }
        }
        ChallengeKey::parse(raw_key)
    }

    async fn record_mismatch(&self, code: &VerificationCode) -> DomainResult<()> {
        let Some(cap) = self.config.max_failed_attempts else {
            tracing::info!(
                key = %Self::log_key(&code.key, code.kind),
                code_id = %code.id,
                event = "code_mismatch",
                "Submitted code does not match"
            );
            return Ok(());
        };

        let attempts = self
            .store
            .record_failed_attempt(&code.key, code.id)
            .await
            .map_err(Self::store_error)?;

        tracing::info!(
            key = %Self::log_key(&code.key, code.kind),
            code_id = %code.id,
            attempts = attempts.unwrap_or_default(),
            max_attempts = cap,
            event = "code_mismatch",
            "Submitted code does not match"
        );

        if matches!(attempts, Some(n) if n >= cap) {
            self.store
                .remove_if_current(&code.key, code.id)
                .await
                .map_err(Self::store_error)?;
            tracing::warn!(
                key = %Self::log_key(&code.key, code.kind),
                code_id = %code.id,
                event = "code_attempts_exhausted",
                "Too many wrong submissions, code removed"
            );
        }
        Ok(())
    }

    fn store_error(e: String) -> DomainError {
        tracing::error!(error = %e, event = "code_store_failed", "Code store operation failed");
        DomainError::Internal {
            message: format!("Code store failure: {}", e),
        }
    }

    fn log_key(key: &ChallengeKey, kind: ChallengeKind) -> String {
        match kind {
            ChallengeKind::Sms => mask_phone_number(key.as_str()),
            ChallengeKind::Image => key.to_string(),
        }
    }
}
