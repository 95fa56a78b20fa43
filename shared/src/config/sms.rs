//! SMS provider configuration module

use serde::{Deserialize, Serialize};

/// SMS service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// SMS service provider ("mock", "http")
    pub provider: String,

    /// Gateway endpoint that accepts `{to, message}` JSON (http provider)
    #[serde(default)]
    pub gateway_url: String,

    /// Bearer credential for the gateway
    #[serde(default)]
    pub api_key: String,

    /// Sender name or number shown to the recipient
    #[serde(default)]
    pub sender_id: String,

    /// Maximum retry attempts for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry delay in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Timeout for gateway requests in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: String::from("mock"),
            gateway_url: String::new(),
            api_key: String::new(),
            sender_id: String::from("Dragon"),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("SMS_PROVIDER").unwrap_or(defaults.provider),
            gateway_url: std::env::var("SMS_GATEWAY_URL").unwrap_or_default(),
            api_key: std::env::var("SMS_API_KEY").unwrap_or_default(),
            sender_id: std::env::var("SMS_SENDER_ID").unwrap_or(defaults.sender_id),
            max_retries: std::env::var("SMS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_delay_ms: std::env::var("SMS_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_delay_ms),
            request_timeout_secs: std::env::var("SMS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    10
}
