//! Verification code configuration module
//!
//! Per-kind generation settings (length, lifetime, alphabet) and the
//! whitelist of dialing prefixes that may receive SMS codes.

use serde::{Deserialize, Serialize};

/// Alphabet a code is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Charset {
    /// `0-9`
    Digits,
    /// `0-9A-Za-z`
    Alnum,
}

impl Charset {
    /// Characters available to the generator
    pub fn alphabet(&self) -> &'static [u8] {
        match self {
            Charset::Digits => b"0123456789",
            Charset::Alnum => b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
        }
    }
}

impl std::str::FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DIGITS" => Ok(Charset::Digits),
            "ALNUM" => Ok(Charset::Alnum),
            _ => Err(format!("Invalid charset: {}", s)),
        }
    }
}

/// Longest code a generator will produce
pub const MAX_CODE_LENGTH: usize = 64;

/// Longest a code may stay valid: one day
pub const MAX_CODE_TTL_SECONDS: i64 = 86_400;

/// Generation settings for one kind of code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CodeConfig {
    /// Number of characters in a code
    pub length: usize,
    /// Seconds a code stays valid after issuance
    pub ttl_seconds: i64,
    /// Alphabet the code is drawn from
    pub charset: Charset,
}

impl CodeConfig {
    /// Six digits, valid for two minutes
    pub fn sms() -> Self {
        Self {
            length: 6,
            ttl_seconds: 120,
            charset: Charset::Digits,
        }
    }

    /// Four alphanumerics, valid for one minute
    pub fn image() -> Self {
        Self {
            length: 4,
            ttl_seconds: 60,
            charset: Charset::Alnum,
        }
    }

    /// Check the settings can produce a usable code
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_CODE_LENGTH).contains(&self.length) {
            return Err(format!("code length must be between 1 and {}", MAX_CODE_LENGTH));
        }
        if !(1..=MAX_CODE_TTL_SECONDS).contains(&self.ttl_seconds) {
            return Err(format!("code ttl must be between 1 and {} seconds", MAX_CODE_TTL_SECONDS));
        }
        Ok(())
    }

    fn from_env_with(prefix: &str, defaults: Self) -> Self {
        Self {
            length: std::env::var(format!("{}_CODE_LENGTH", prefix))
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.length),
            ttl_seconds: std::env::var(format!("{}_CODE_TTL_SECONDS", prefix))
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl_seconds),
            charset: std::env::var(format!("{}_CODE_CHARSET", prefix))
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.charset),
        }
    }
}

/// A supported country and its dialing prefix
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CountryPrefix {
    /// Human readable country name
    pub country: String,
    /// Dialing prefix without `+`, e.g. `86`
    pub prefix: String,
}

impl CountryPrefix {
    pub fn new(country: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            prefix: prefix.into(),
        }
    }
}

/// Parse `China:86,Singapore:65` into prefix entries, skipping malformed items
pub fn parse_country_prefixes(raw: &str) -> Vec<CountryPrefix> {
    raw.split(',')
        .filter_map(|item| {
            let (country, prefix) = item.split_once(':')?;
            let (country, prefix) = (country.trim(), prefix.trim().trim_start_matches('+'));
            if country.is_empty() || prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            Some(CountryPrefix::new(country, prefix))
        })
        .collect()
}

/// Verification code configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Settings for SMS codes
    #[serde(default = "CodeConfig::sms")]
    pub sms: CodeConfig,

    /// Settings for image codes
    #[serde(default = "CodeConfig::image")]
    pub image: CodeConfig,

    /// Countries allowed to receive SMS codes
    #[serde(default = "default_country_prefixes")]
    pub country_prefixes: Vec<CountryPrefix>,

    /// Exact number of digits in an SMS challenge key (prefix included)
    #[serde(default = "default_sms_key_length")]
    pub sms_key_length: usize,

    /// Remove a code after this many wrong submissions (unbounded when unset)
    #[serde(default)]
    pub max_failed_attempts: Option<u32>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            sms: CodeConfig::sms(),
            image: CodeConfig::image(),
            country_prefixes: default_country_prefixes(),
            sms_key_length: default_sms_key_length(),
            max_failed_attempts: None,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let country_prefixes = std::env::var("SMS_COUNTRY_PREFIXES")
            .ok()
            .map(|raw| parse_country_prefixes(&raw))
            .filter(|prefixes| !prefixes.is_empty())
            .unwrap_or(defaults.country_prefixes);

        Self {
            sms: CodeConfig::from_env_with("SMS", defaults.sms),
            image: CodeConfig::from_env_with("IMAGE", defaults.image),
            country_prefixes,
            sms_key_length: std::env::var("SMS_KEY_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sms_key_length),
            max_failed_attempts: std::env::var("MAX_FAILED_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n > 0),
        }
    }
}

fn default_country_prefixes() -> Vec<CountryPrefix> {
    vec![CountryPrefix::new("China", "86")]
}

fn default_sms_key_length() -> usize {
    13
}
