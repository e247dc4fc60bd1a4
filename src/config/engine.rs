//! Completion engine configuration

use reqwest::Url;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::engine::OpenAiEngineConfig;
use crate::domain::chat::EngineKind;

const MAX_TIMEOUT_SECS: u64 = 600;
const PROXY_SCHEMES: [&str; 4] = ["http", "https", "socks5", "socks5h"];

/// Completion engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Engine family
    #[serde(default)]
    pub kind: EngineKind,

    /// API key for the upstream service
    pub secret_key: Option<Secret<String>>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model requested upstream
    #[serde(default = "default_model")]
    pub model: String,

    /// Optional http, https or socks5 proxy URL
    pub proxy: Option<String>,

    /// Upper bound on one engine call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Capacity of the per-request delivery channel
    #[serde(default = "default_delivery_buffer")]
    pub delivery_buffer: usize,
}

impl EngineConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_secret_key(&self) -> bool {
        self.secret_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Builds the OpenAI engine configuration.
    pub fn openai_config(&self) -> Result<OpenAiEngineConfig, ValidationError> {
        let key = self
            .secret_key
            .as_ref()
            .filter(|_| self.has_secret_key())
            .ok_or(ValidationError::MissingRequired("CHAT_RELAY__ENGINE__SECRET_KEY"))?;

        let mut config = OpenAiEngineConfig::new(key.expose_secret().clone())
            .with_base_url(&self.base_url)
            .with_model(&self.model);

        if let Some(proxy) = self.proxy.as_deref().filter(|p| !p.is_empty()) {
            config = config.with_proxy(proxy);
        }

        Ok(config)
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_secret_key() {
            return Err(ValidationError::MissingRequired("CHAT_RELAY__ENGINE__SECRET_KEY"));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.delivery_buffer == 0 {
            return Err(ValidationError::InvalidDeliveryBuffer);
        }

        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ValidationError::InvalidBaseUrl(self.base_url.clone())),
        }

        if let Some(proxy) = self.proxy.as_deref().filter(|p| !p.is_empty()) {
            match Url::parse(proxy) {
                Ok(url) if PROXY_SCHEMES.contains(&url.scheme()) => {}
                _ => return Err(ValidationError::InvalidProxy(proxy.to_string())),
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            secret_key: None,
            base_url: default_base_url(),
            model: default_model(),
            proxy: None,
            timeout_secs: default_timeout(),
            delivery_buffer: default_delivery_buffer(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_delivery_buffer() -> usize {
    32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> EngineConfig {
        EngineConfig {
            secret_key: Some(Secret::new("sk-test".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.kind, EngineKind::ChatGpt);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.delivery_buffer, 32);
        assert_eq!(config.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_timeout_duration() {
        let config = EngineConfig {
            timeout_secs: 90,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(90));
    }

    #[test]
    fn test_validation_missing_key() {
        assert_eq!(
            EngineConfig::default().validate(),
            Err(ValidationError::MissingRequired("CHAT_RELAY__ENGINE__SECRET_KEY"))
        );

        let blank = EngineConfig {
            secret_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_validation_timeout_range() {
        for timeout_secs in [0, 601] {
            let config = EngineConfig {
                timeout_secs,
                ..keyed()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }

        let config = EngineConfig {
            timeout_secs: 600,
            ..keyed()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_proxy_scheme() {
        let socks = EngineConfig {
            proxy: Some("socks5://127.0.0.1:1080".to_string()),
            ..keyed()
        };
        assert!(socks.validate().is_ok());

        let ftp = EngineConfig {
            proxy: Some("ftp://proxy.local:21".to_string()),
            ..keyed()
        };
        assert!(matches!(ftp.validate(), Err(ValidationError::InvalidProxy(_))));
    }

    #[test]
    fn test_validation_base_url() {
        let config = EngineConfig {
            base_url: "not a url".to_string(),
            ..keyed()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_openai_config_carries_settings() {
        let config = EngineConfig {
            model: "gpt-4o-mini".to_string(),
            proxy: Some("http://proxy.local:8080".to_string()),
            ..keyed()
        };

        let openai = config.openai_config().unwrap();

        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(openai.proxy.as_deref(), Some("http://proxy.local:8080"));
    }

    #[test]
    fn test_secret_key_is_redacted_in_debug() {
        let debug = format!("{:?}", keyed());
        assert!(!debug.contains("sk-test"));
    }
}
