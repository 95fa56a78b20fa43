//! Code generation strategies

use chrono::{DateTime, Utc};
use dragon_shared::config::CodeConfig;
use rand::Rng;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{ChallengeKey, ChallengeKind};
use crate::errors::{DomainError, DomainResult};

/// Produces random codes of a fixed length and alphabet
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    config: CodeConfig,
}

impl CodeGenerator {
    /// Create a generator, rejecting settings that cannot produce a usable code
    pub fn new(config: CodeConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Validation { message })?;
        Ok(Self { config })
    }

    /// Six digits, two minutes
    pub fn numeric() -> Self {
        Self {
            config: CodeConfig::sms(),
        }
    }

    /// Four alphanumerics, one minute
    pub fn visual() -> Self {
        Self {
            config: CodeConfig::image(),
        }
    }

    pub fn config(&self) -> &CodeConfig {
        &self.config
    }

    /// Draw a fresh code value
    pub fn generate_value(&self) -> String {
        let alphabet = self.config.charset.alphabet();
        let mut rng = rand::thread_rng();
        (0..self.config.length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
            .collect()
    }

    /// Build a code for `key` issued at `now`
    pub fn generate(&self, key: ChallengeKey, kind: ChallengeKind, now: DateTime<Utc>) -> VerificationCode {
        VerificationCode::new(key, kind, self.generate_value(), now, self.config.ttl_seconds)
    }
}

/// One generator per challenge kind
#[derive(Debug, Clone)]
pub struct CodeGenerators {
    pub sms: CodeGenerator,
    pub image: CodeGenerator,
}

impl CodeGenerators {
    pub fn new(sms: CodeConfig, image: CodeConfig) -> DomainResult<Self> {
        Ok(Self {
            sms: CodeGenerator::new(sms)?,
            image: CodeGenerator::new(image)?,
        })
    }

    pub fn for_kind(&self, kind: ChallengeKind) -> &CodeGenerator {
        match kind {
            ChallengeKind::Sms => &self.sms,
            ChallengeKind::Image => &self.image,
        }
    }
}

impl Default for CodeGenerators {
    fn default() -> Self {
        Self {
            sms: CodeGenerator::numeric(),
            image: CodeGenerator::visual(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dragon_shared::config::Charset;

    #[test]
    fn test_numeric_codes() {
        let generator = CodeGenerator::numeric();
        for _ in 0..50 {
            let value = generator.generate_value();
            assert_eq!(value.len(), 6);
            assert!(value.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_visual_codes() {
        let generator = CodeGenerator::visual();
        for _ in 0..50 {
            let value = generator.generate_value();
            assert_eq!(value.len(), 4);
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_sets_expiry() {
        let now = Utc::now();
        let key = ChallengeKey::parse("8613800000000").unwrap();
        let code = CodeGenerator::numeric().generate(key.clone(), ChallengeKind::Sms, now);

        assert_eq!(code.key, key);
        assert_eq!(code.kind, ChallengeKind::Sms);
        assert_eq!(code.created_at, now);
        assert_eq!(code.expires_at, now + Duration::seconds(120));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let zero_length = CodeConfig {
            length: 0,
            ttl_seconds: 60,
            charset: Charset::Digits,
        };
        assert!(matches!(
            CodeGenerator::new(zero_length),
            Err(DomainError::Validation { .. })
        ));

        let zero_ttl = CodeConfig {
            length: 4,
            ttl_seconds: 0,
            charset: Charset::Alnum,
        };
        assert!(CodeGenerator::new(zero_ttl).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_ttl_and_length() {
        let huge_ttl = CodeConfig {
            length: 6,
            ttl_seconds: 20_000_000_000_000,
            charset: Charset::Digits,
        };
        assert!(matches!(
            CodeGenerator::new(huge_ttl),
            Err(DomainError::Validation { .. })
        ));

        let huge_length = CodeConfig {
            length: 1_000_000,
            ttl_seconds: 60,
            charset: Charset::Alnum,
        };
        assert!(CodeGenerator::new(huge_length).is_err());

        let one_day = CodeGenerator::new(CodeConfig {
            length: 6,
            ttl_seconds: 86_400,
            charset: Charset::Digits,
        })
        .unwrap();
        let now = Utc::now();
        let key = ChallengeKey::parse("8613800000000").unwrap();
        let code = one_day.generate(key, ChallengeKind::Sms, now);
        assert_eq!(code.expires_at, now + Duration::days(1));
    }

    #[test]
    fn test_custom_length() {
        let generator = CodeGenerator::new(CodeConfig {
            length: 10,
            ttl_seconds: 30,
            charset: Charset::Digits,
        })
        .unwrap();
        assert_eq!(generator.generate_value().len(), 10);
    }

    #[test]
    fn test_for_kind() {
        let generators = CodeGenerators::default();
        assert_eq!(generators.for_kind(ChallengeKind::Sms).config().charset, Charset::Digits);
        assert_eq!(generators.for_kind(ChallengeKind::Image).config().charset, Charset::Alnum);
    }
}
