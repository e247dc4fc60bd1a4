//! chat-relay server binary.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::adapters::engine::OpenAiEngine;
use chat_relay::adapters::http::{app_router, shutdown_on, AppState};
use chat_relay::application::handlers::AskHandler;
use chat_relay::config::{AppConfig, ConfigError, ServerConfig};
use chat_relay::domain::chat::EngineKind;
use chat_relay::ports::{CompletionEngine, EngineError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build completion engine: {0}")]
    Engine(#[from] EngineError),

    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate().map_err(ConfigError::from)?;

    let engine = build_engine(&config)?;
    let ask_handler = Arc::new(AskHandler::with_config(engine, config.ask_handler_config()));

    let app = app_router(AppState {
        ask_handler,
        engine_timeout: config.engine.timeout(),
        cors_origins: config.server.cors_origins_list(),
    });

    let addr = config.server.socket_addr().map_err(ConfigError::from)?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        engine = %config.engine.kind,
        model = %config.engine.model,
        "chat relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    info!("chat relay stopped");
    Ok(())
}

fn build_engine(config: &AppConfig) -> Result<Arc<dyn CompletionEngine>, StartupError> {
    match config.engine.kind {
        EngineKind::ChatGpt => {
            let openai = config.engine.openai_config().map_err(ConfigError::from)?;
            Ok(Arc::new(OpenAiEngine::new(openai)?))
        }
    }
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
