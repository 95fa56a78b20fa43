//! HTTP SMS gateway sender
//!
//! POSTs `{to, message, sender}` JSON to a configured endpoint with a bearer
//! credential. Network errors, 429 and 5xx responses are retried with
//! exponential backoff; other 4xx responses fail immediately.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use dragon_core::domain::VerificationCode;
use dragon_core::services::SmsSender;
use dragon_shared::config::SmsConfig;
use dragon_shared::utils::phone::mask_phone_number;

use super::compose_message;
use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    message: &'a str,
    sender: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayResponse {
    #[serde(default, alias = "id", alias = "sid")]
    message_id: Option<String>,
}

/// SMS sender backed by an HTTP gateway
pub struct HttpSmsGateway {
    client: Client,
    config: SmsConfig,
}

impl HttpSmsGateway {
    pub fn new(config: SmsConfig) -> Result<Self, InfrastructureError> {
        if config.gateway_url.is_empty() {
            return Err(InfrastructureError::Config(
                "SMS_GATEWAY_URL is required for the http provider".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!("HTTP SMS gateway initialized for {}", config.gateway_url);

        Ok(Self { client, config })
    }

    async fn send_with_retry(&self, to: &str, message: &str) -> Result<String, InfrastructureError> {
        let max_retries = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!("Sending SMS attempt {}/{} to {}", attempts, max_retries, mask_phone_number(to));

            let failure = match self.post(to, message).await {
                Ok(message_id) => {
                    info!(
                        provider = "http",
                        phone = %mask_phone_number(to),
                        message_id = %message_id,
                        "SMS sent"
                    );
                    return Ok(message_id);
                }
                Err(failure) => failure,
            };

            error!("Failed to send SMS (attempt {}/{}): {}", attempts, max_retries, failure.reason);

            if !failure.retryable {
                return Err(InfrastructureError::Sms(failure.reason));
            }
            if attempts >= max_retries {
                return Err(InfrastructureError::Sms(format!(
                    "Failed to send SMS after {} attempts: {}",
                    attempts, failure.reason
                )));
            }

            warn!("Retrying SMS send after {:?}", delay);
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    async fn post(&self, to: &str, message: &str) -> Result<String, SendFailure> {
        let mut request = self.client.post(&self.config.gateway_url).json(&GatewayRequest {
            to,
            message,
            sender: &self.config.sender_id,
        });
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(|e| SendFailure {
            reason: e.to_string(),
            retryable: true,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendFailure {
                reason: format!("Gateway responded with {}", status),
                retryable: is_retryable_status(status),
            });
        }

        let body: GatewayResponse = response.json().await.unwrap_or_default();
        Ok(body
            .message_id
            .unwrap_or_else(|| format!("http_{}", Uuid::new_v4())))
    }
}

struct SendFailure {
    reason: String,
    retryable: bool,
}

/// Whether a gateway status is worth retrying
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl SmsSender for HttpSmsGateway {
    async fn send(&self, recipient: &str, code: &VerificationCode) -> Result<String, String> {
        let message = compose_message(code);
        self.send_with_retry(recipient, &message)
            .await
            .map_err(|e| e.to_string())
    }
}
