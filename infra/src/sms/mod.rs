//! SMS Module
//!
//! Outbound SMS senders implementing [`dragon_core::services::SmsSender`]:
//! - **Mock**: logs instead of sending (development default)
//! - **HTTP gateway**: JSON POST to a configured provider endpoint
//!
//! Phone numbers are masked in every log line.

use std::sync::Arc;

use dragon_core::domain::VerificationCode;
use dragon_core::services::SmsSender;
use dragon_shared::config::SmsConfig;

pub mod http_gateway;
pub mod mock_sms;

pub use http_gateway::HttpSmsGateway;
pub use mock_sms::MockSmsSender;


/// Text sent to the recipient
pub fn compose_message(code: &VerificationCode) -> String {
    let minutes = (code.ttl().num_seconds() + 59) / 60;
    format!(
        "Your Dragon verification code is {}. It expires in {} minute{}.",
        code.value,
        minutes,
        if minutes == 1 { "" } else { "s" }
    )
}

/// Create the SMS sender named by the configuration
///
/// Unknown providers and a misconfigured gateway fall back to the mock sender.
pub fn create_sms_sender(config: &SmsConfig) -> Arc<dyn SmsSender> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockSmsSender::new()),
        "http" => match HttpSmsGateway::new(config.clone()) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                tracing::error!("Failed to initialize HTTP SMS gateway: {}", e);
                tracing::warn!("Falling back to mock SMS sender");
                Arc::new(MockSmsSender::new())
            }
        },
        other => {
            tracing::warn!("Unknown SMS provider '{}', using mock implementation", other);
            Arc::new(MockSmsSender::new())
        }
    }
}
