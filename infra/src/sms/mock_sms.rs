//! Mock SMS sender
//!
//! Logs the message instead of sending it. Used in development and tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use dragon_core::domain::VerificationCode;
use dragon_core::services::SmsSender;
use dragon_shared::utils::phone::mask_phone_number;

use super::compose_message;

/// Mock SMS sender for development and testing
#[derive(Clone, Default)]
pub struct MockSmsSender {
    /// Number of messages accepted
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures
    simulate_failure: Arc<AtomicBool>,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that fails every send
    pub fn failing() -> Self {
        let sender = Self::new();
        sender.set_simulate_failure(true);
        sender
    }

    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, recipient: &str, code: &VerificationCode) -> Result<String, String> {
        let masked = mask_phone_number(recipient);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(provider = "mock", phone = %masked, "Mock SMS sender simulating failure");
            return Err("Simulated SMS sending failure".to_string());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            target: "sms_service",
            provider = "mock",
            phone = %masked,
            message_id = %message_id,
            count,
            "Mock SMS accepted"
        );
        tracing::debug!(target: "sms_service", content = %compose_message(code), "Mock SMS content");

        Ok(message_id)
    }
}
