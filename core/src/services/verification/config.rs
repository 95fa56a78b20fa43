//! Configuration for the verification service

use dragon_shared::config::{CodeConfig, VerificationConfig};

use crate::domain::value_objects::CountryPrefixTable;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Generation settings for SMS codes
    pub sms: CodeConfig,
    /// Generation settings for image codes
    pub image: CodeConfig,
    /// Countries allowed to receive SMS codes
    pub country_prefixes: CountryPrefixTable,
    /// Exact digit count of an SMS key
    pub sms_key_length: usize,
    /// Remove a code after this many wrong submissions
    pub max_failed_attempts: Option<u32>,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            sms: config.sms.clone(),
            image: config.image.clone(),
            country_prefixes: CountryPrefixTable::new(config.country_prefixes.clone()),
            sms_key_length: config.sms_key_length,
            max_failed_attempts: config.max_failed_attempts.filter(|cap| *cap > 0),
        }
    }
}
