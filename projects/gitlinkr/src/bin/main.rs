use std::net::SocketAddr;

use axum::serve;
use projects_gitlinkr::{
    app,
    config::{Config, ConfigError},
    state::State,
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MainError {
    #[error("Config: {source}")]
    Config {
        #[source]
        source: ConfigError,
    },

    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },

    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },

    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env().map_err(|source| MainError::Config { source })?;
    utils_trace::init(&config.trace).map_err(|source| MainError::TracingInit { source })?;

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "could not read .env");
        }
    }
    config.log_summary();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = State::new(config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", addr);

    serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| MainError::Serve { source })?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
