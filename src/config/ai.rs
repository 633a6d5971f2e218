//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which extraction backend to use
    #[serde(default)]
    pub provider: AiProviderKind,

    /// OpenAI API key (required for `openai`)
    pub openai_api_key: Option<Secret<String>>,

    /// Model override; each provider has its own default
    pub model: Option<String>,

    /// Base URL override for OpenAI-compatible servers
    pub base_url: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Sampling temperature for extraction calls
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Extraction backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    #[default]
    OpenAI,
    /// Local Ollama through its OpenAI-compatible endpoint
    Ollama,
    /// No model; each reply answers the question just asked
    Direct,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an OpenAI key is present and non-empty
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == AiProviderKind::OpenAI && !self.has_openai() {
            return Err(ValidationError::MissingRequired("INTAKE_SHERPA__AI__OPENAI_API_KEY"));
        }

        if self.provider != AiProviderKind::Direct && self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProviderKind::default(),
            openai_api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            temperature: default_temperature(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    1
}

fn default_temperature() -> f32 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProviderKind::OpenAI);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.temperature, 0.2);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_openai_requires_key() {
        let config = AiConfig::default();
        assert!(matches!(config.validate(), Err(ValidationError::MissingRequired(_))));

        let config = AiConfig {
            openai_api_key: Some(Secret::new("   ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_openai());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = AiConfig {
            provider: AiProviderKind::Ollama,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected_for_model_providers() {
        let config = AiConfig {
            provider: AiProviderKind::Ollama,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));

        let direct = AiConfig {
            provider: AiProviderKind::Direct,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(direct.validate().is_ok());
    }

    #[test]
    fn test_key_is_redacted_in_debug() {
        let config = AiConfig {
            openai_api_key: Some(Secret::new("sk-very-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}
