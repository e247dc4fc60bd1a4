//! HTTP DTOs for the capability and liveness endpoints.
//!
//! Shapes are fixed by the web client, including the capitalized `"Success"`
//! status.

use serde::Serialize;

/// API model name the web client expects.
pub const API_MODEL: &str = "ChatGPTAPI";

/// Placeholder for values the relay does not disclose.
const UNDISCLOSED: &str = "-";

const SUCCESS: &str = "Success";

/// Response for `GET /ping`.
#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub message: String,
}

impl Default for PingResponse {
    fn default() -> Self {
        Self {
            message: "pong".to_string(),
        }
    }
}

/// Response for `POST /config`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub message: Option<String>,
    pub data: ConfigData,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigData {
    pub api_model: String,
    pub reverse_proxy: String,
    pub timeout_ms: u64,
    pub socks_proxy: String,
    pub https_proxy: String,
    pub balance: String,
}

impl ConfigResponse {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            message: None,
            data: ConfigData {
                api_model: API_MODEL.to_string(),
                reverse_proxy: UNDISCLOSED.to_string(),
                timeout_ms,
                socks_proxy: UNDISCLOSED.to_string(),
                https_proxy: UNDISCLOSED.to_string(),
                balance: UNDISCLOSED.to_string(),
            },
            status: SUCCESS.to_string(),
        }
    }
}

/// Response for `POST /session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub status: String,
    pub message: String,
    pub data: SessionData,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionData {
    pub auth: bool,
    pub model: String,
}

impl Default for SessionResponse {
    fn default() -> Self {
        Self {
            status: SUCCESS.to_string(),
            message: String::new(),
            data: SessionData {
                auth: false,
                model: API_MODEL.to_string(),
            },
        }
    }
}

/// Response for `POST /verify`: an empty object.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyResponse {}
