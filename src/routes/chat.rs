//! Chat handler

use crate::errors::AppError;
use crate::routes::effective_user;
use crate::routes::papers::UserParams;
use crate::services::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[instrument(skip(state))]
pub async fn chat_with_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserParams>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = effective_user(params.user_id);

    let exchange = state
        .chat_service
        .chat(&user, id, &request.question)
        .await?;

    Ok(Json(exchange))
}
