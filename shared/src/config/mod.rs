//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Code store backend and sweep settings
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration
//! - `sms` - SMS provider configuration
//! - `verification` - Code generation and SMS eligibility

pub mod cache;
pub mod environment;
pub mod server;
pub mod sms;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::{CacheConfig, CodeStoreBackend};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use sms::SmsConfig;
pub use verification::{
    Charset, CodeConfig, CountryPrefix, VerificationConfig, MAX_CODE_LENGTH, MAX_CODE_TTL_SECONDS,
};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Code store configuration
    pub cache: CacheConfig,

    /// Verification code configuration
    pub verification: VerificationConfig,

    /// SMS provider configuration
    pub sms: SmsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from flat environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            cache: CacheConfig::from_env(),
            verification: VerificationConfig::from_env(),
            sms: SmsConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Load the layered configuration
    ///
    /// Layers, lowest priority first:
    /// 1. `.env` file and flat environment variables (see [`AppConfig::from_env`])
    /// 2. optional `config.{environment}.toml` in the working directory
    /// 3. `DRAGON__SECTION__FIELD` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let base = Self::from_env();
        let file = base.environment.config_file().to_string();

        config::Config::builder()
            .add_source(config::Config::try_from(&base)?)
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix("DRAGON")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Validate settings that would otherwise fail at request time
    pub fn validate(&self) -> Result<(), String> {
        self.verification
            .sms
            .validate()
            .map_err(|e| format!("sms: {}", e))?;
        self.verification
            .image
            .validate()
            .map_err(|e| format!("image: {}", e))?;
        if self.verification.country_prefixes.is_empty() {
            return Err("at least one SMS country prefix is required".to_string());
        }
        if self.cache.shards == 0 {
            return Err("cache shards must be at least 1".to_string());
        }
        Ok(())
    }
}
