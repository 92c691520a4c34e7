use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::health_check))
        .route("/search", post(handlers::search))
        .route("/chat", post(handlers::chat))
        .route("/conversations/:conversation_id", get(handlers::history))
        .route("/conversations/:conversation_id", delete(handlers::delete))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
