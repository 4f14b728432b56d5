//! Health check handlers

use crate::services::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub database: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - healthy whenever the server is running
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness probe - checks store connectivity
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadyResponse> {
    let database = match state.papers.ping().await {
        Ok(()) => CheckResult {
            status: "up".to_string(),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            error: Some(e.to_string()),
        },
    };

    let status = if database.status == "up" {
        "ready"
    } else {
        "not_ready"
    };

    Json(ReadyResponse {
        status: status.to_string(),
        database,
    })
}
