//! Response stream configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::StreamLimits;
use crate::domain::chat::ChunkErrorPolicy;

/// Response stream configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamConfig {
    /// Handling of per-chunk engine errors
    #[serde(default)]
    pub chunk_error_policy: ChunkErrorPolicy,

    /// Maximum chunk frames per response
    pub max_frames: Option<usize>,

    /// Maximum bytes per response
    pub max_bytes: Option<usize>,
}

impl StreamConfig {
    /// Get the configured caps
    pub fn limits(&self) -> StreamLimits {
        StreamLimits {
            max_frames: self.max_frames,
            max_bytes: self.max_bytes,
        }
    }

    /// Validate stream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_frames == Some(0) {
            return Err(ValidationError::InvalidStreamLimit("max_frames"));
        }
        if self.max_bytes == Some(0) {
            return Err(ValidationError::InvalidStreamLimit("max_bytes"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.chunk_error_policy, ChunkErrorPolicy::Skip);
        assert_eq!(config.limits(), StreamLimits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = StreamConfig {
            max_frames: Some(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidStreamLimit("max_frames"))
        );

        let config = StreamConfig {
            max_bytes: Some(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidStreamLimit("max_bytes"))
        );
    }
}
