//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Engine timeout must be between 1 and 600 seconds")]
    InvalidTimeout,

    #[error("Delivery buffer must be at least 1")]
    InvalidDeliveryBuffer,

    #[error("Invalid engine base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),

    #[error("Stream limit {0} must be greater than zero")]
    InvalidStreamLimit(&'static str),
}
