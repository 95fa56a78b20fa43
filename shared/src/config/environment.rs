//! Deployment environment and logging configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Deployment environment
///
/// Read from `ENVIRONMENT` (falling back to `ENV`, then `RUST_ENV`).
/// Picks the layered config file and the logging defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn from_env() -> Self {
        ["ENVIRONMENT", "ENV", "RUST_ENV"]
            .iter()
            .find_map(|name| env::var(name).ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Optional TOML overlay loaded by `AppConfig::load`
    pub fn config_file(&self) -> String {
        format!("config.{}.toml", self)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `dragon_core=debug,info`
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Include file and line of the log call
    #[serde(default)]
    pub source_location: bool,

    /// Colored output, terminal only
    #[serde(default)]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Debug-level pretty logs in development, JSON elsewhere
    pub fn for_environment(env: Environment) -> Self {
        if env.is_development() {
            Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                source_location: true,
                ansi: true,
            }
        } else {
            Self {
                level: String::from("info"),
                format: LogFormat::Json,
                source_location: false,
                ansi: false,
            }
        }
    }

    /// Apply `LOG_LEVEL` / `LOG_FORMAT` overrides on top of the environment defaults
    pub fn from_env(env: Environment) -> Self {
        let mut config = Self::for_environment(env);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|f| f.parse().ok()) {
            config.format = format;
        }
        config
    }
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}
