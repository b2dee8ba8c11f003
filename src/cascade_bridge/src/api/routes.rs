use super::handlers::{chat_completions, health, list_models, not_found};
use crate::core::SharedState;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

/// Idle connections (including long-polling chat completions) are dropped
/// after this long; the poll loop itself caps out well under it.
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// The only fallible middleware in this stack is `TimeoutLayer` below, so
/// anything reaching here is an idle-connection timeout.
async fn on_timeout(_err: BoxError) -> (StatusCode, &'static str) {
    (StatusCode::REQUEST_TIMEOUT, "connection idle timeout")
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .route("/chat/completions", post(chat_completions))
        .fallback(not_found)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(on_timeout))
                .layer(TimeoutLayer::new(IDLE_TIMEOUT)),
        )
        .with_state(state)
}
