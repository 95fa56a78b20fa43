//! Language and internationalization types

use serde::{Deserialize, Serialize};

/// Language preference for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    /// Pick the highest-quality supported language from an Accept-Language header
    ///
    /// Example header: `zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7`
    pub fn from_accept_language(header: &str) -> Self {
        let mut preferred = Language::English;
        let mut max_quality = 0.0_f32;

        for entry in header.split(',') {
            let mut parts = entry.trim().split(';');
            let tag = parts.next().unwrap_or_default().trim().to_lowercase();
            let quality = parts
                .next()
                .and_then(|q| q.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let candidate = if tag.starts_with("zh") {
                Language::Chinese
            } else if tag.starts_with("en") {
                Language::English
            } else {
                continue;
            };

            if quality > max_quality {
                preferred = candidate;
                max_quality = quality;
            }
        }

        preferred
    }

    /// Get language code (ISO 639-1)
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// Choose between an English and a Chinese rendering of a message
    pub fn localize<'a>(&self, en: &'a str, zh: &'a str) -> &'a str {
        match self {
            Language::English => en,
            Language::Chinese => zh,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::English),
            "zh" | "chi" | "chinese" | "中文" => Ok(Language::Chinese),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}
