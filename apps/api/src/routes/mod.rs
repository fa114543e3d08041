pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/evaluate",
            post(handlers::handle_evaluate).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/v1/evaluate/text",
            post(handlers::handle_evaluate_text),
        )
        .with_state(state)
}
