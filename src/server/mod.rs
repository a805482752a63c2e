//! HTTP API Server
//!
//! Axum-based server exposing the JSON API and the browser form.

use anyhow::Result;

use crate::config::ServerConfig;
use crate::service::TtsService;

pub mod form;
pub mod handlers;
pub mod routes;
pub mod state;

pub async fn start_server(service: TtsService, config: ServerConfig) -> Result<()> {
    let state = state::AppState::new(service).with_strict_status(config.strict_status);
    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Listening on http://{addr}");
    log::info!("  GET  /        browser form");
    log::info!("  POST /tts     JSON API");
    log::info!("  GET  /audio   latest output");
    if !config.strict_status {
        log::info!("/tts answers HTTP 200 for failures too (use --strict-status to change)");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
