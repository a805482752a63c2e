use axum::{
    routing::{get, post},
    Router,
};

use crate::server::handlers;
use crate::server::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::form_page).post(handlers::form_submit))
        .route("/health", get(handlers::health_check))
        .route("/tts", post(handlers::tts))
        .route("/audio", get(handlers::audio))
        .with_state(state)
}
