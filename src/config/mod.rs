//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHAT_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chat_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod engine;
mod error;
mod server;
mod stream;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use stream::StreamConfig;

use serde::Deserialize;

use crate::application::handlers::AskHandlerConfig;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion engine configuration (key, endpoint, proxy, timeout)
    #[serde(default)]
    pub engine: EngineConfig,

    /// Response stream configuration (chunk error policy, size caps)
    #[serde(default)]
    pub stream: StreamConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHAT_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_RELAY__SERVER__PORT=8089` -> `server.port = 8089`
    /// - `CHAT_RELAY__ENGINE__SECRET_KEY=...` -> `engine.secret_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.engine.validate()?;
        self.stream.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Builds the ask handler configuration.
    pub fn ask_handler_config(&self) -> AskHandlerConfig {
        AskHandlerConfig {
            engine_timeout: self.engine.timeout(),
            delivery_buffer: self.engine.delivery_buffer,
            chunk_error_policy: self.stream.chunk_error_policy,
            limits: self.stream.limits(),
        }
    }
}
