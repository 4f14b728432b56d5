//! Upload handler
//!
//! Accepts a multipart form with a `file` part (the PDF) and an optional
//! `user_id` part, runs the ingestion pipeline, and returns the created
//! record.

use crate::errors::AppError;
use crate::routes::effective_user;
use crate::routes::papers::PaperResponse;
use crate::services::AppState;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub paper: PaperResponse,
}

#[instrument(skip_all)]
pub async fn upload_paper(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read file part: {}", e)))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("user_id") => {
                user_id = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read user_id part: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| AppError::Validation("no file selected".to_string()))?;
    let user = effective_user(user_id);

    let paper = state.ingest_service.ingest(&filename, bytes, &user).await?;

    Ok(Json(UploadResponse {
        message: "Paper ingested successfully".to_string(),
        paper: PaperResponse::from(paper),
    }))
}
