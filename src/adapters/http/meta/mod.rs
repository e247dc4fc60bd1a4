//! HTTP adapter for the capability and liveness endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ConfigData, ConfigResponse, PingResponse, SessionData, SessionResponse, VerifyResponse,
    API_MODEL,
};
pub use handlers::MetaAppState;
pub use routes::meta_router;
