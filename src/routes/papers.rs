//! Paper listing, retrieval, and deletion handlers

use crate::db::Paper;
use crate::errors::AppError;
use crate::not_found;
use crate::routes::effective_user;
use crate::services::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Wire form of a stored record
#[derive(Debug, Serialize)]
pub struct PaperResponse {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub file_url: String,
    /// Identifier reported by the model (DOI/arXiv id or generated token)
    pub paper_id: String,
    pub file_path: String,
    pub created_at: String,
}

impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        Self {
            id: paper.id,
            user_id: paper.user_id,
            title: paper.title,
            authors: paper.authors,
            abstract_text: paper.abstract_text,
            tags: paper.tags,
            file_url: paper.file_url,
            paper_id: paper.external_id,
            file_path: paper.file_path,
            created_at: paper.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: Option<String>,
    /// Exact-title search; multi-result by design
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct PaperListResponse {
    pub papers: Vec<PaperResponse>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[instrument(skip(state))]
pub async fn list_papers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = effective_user(params.user_id);

    let papers = match params.title {
        Some(title) => state.papers.search_by_title(&user, &title).await?,
        None => state.papers.list_by_user(&user).await?,
    };

    Ok(Json(PaperListResponse {
        papers: papers.into_iter().map(PaperResponse::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = effective_user(params.user_id);

    let paper = state
        .papers
        .find_by_id(&user, id)
        .await?
        .ok_or_else(|| not_found!("paper", id))?;

    Ok(Json(PaperResponse::from(paper)))
}

#[instrument(skip(state))]
pub async fn delete_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = effective_user(params.user_id);

    if !state.papers.delete_by_id(&user, id).await? {
        return Err(not_found!("paper", id));
    }

    tracing::info!(paper_id = %id, user_id = %user, "Paper deleted");

    Ok(Json(DeleteResponse {
        message: format!("Paper {} deleted", id),
    }))
}
