pub mod chat;
pub mod health;
pub mod papers;
pub mod upload;

use crate::services::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Sentinel owner for requests that carry no user_id
pub(crate) const DEFAULT_USER_ID: &str = "default_user";

/// Maximum concurrent requests (backpressure control)
const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Request timeout; generous enough for an LLM round trip
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Upload body cap
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(upload::upload_paper))
        .route("/papers", get(papers::list_papers))
        .route(
            "/papers/{id}",
            get(papers::get_paper).delete(papers::delete_paper),
        )
        .route("/papers/{id}/chat", post(chat::chat_with_paper))
        .route("/health", get(health::health_check))
        .route("/readiness", get(health::readiness_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Resolve the effective owner for a request
pub(crate) fn effective_user(user_id: Option<String>) -> String {
    user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
}
