//! Remote text-generation settings.

use std::time::Duration;

/// Default REST endpoint for the generative-language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    /// API key; requests fail (and advisory calls fall back) when unset
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model for chat answers and prescription scans
    pub fast_model: String,
    /// Model for interaction checks and dosage calculation
    pub reasoning_model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            fast_model: "gemini-3-flash-preview".to_string(),
            reasoning_model: "gemini-3-pro-preview".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GeminiConfig {
    /// Defaults overridden by `GEMINI_*` variables. The key also accepts the
    /// `VITE_GEMINI_API_KEY` name used by the web build.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_opt("GEMINI_API_KEY").or_else(|| env_opt("VITE_GEMINI_API_KEY")),
            base_url: env_opt("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            fast_model: env_opt("GEMINI_FAST_MODEL").unwrap_or(defaults.fast_model),
            reasoning_model: env_opt("GEMINI_REASONING_MODEL").unwrap_or(defaults.reasoning_model),
            timeout: env_opt("GEMINI_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
