use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Every error raised by a leaf component propagates unchanged to the
/// request boundary; the boundary maps it to an HTTP status with the
/// original message in the response body.
#[derive(Error, Debug)]
pub enum AppError {
    /// Caller input malformed (empty filename, missing question)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// PDF parse failure or malformed LLM metadata response
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Requested record or blob absent
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Store connectivity or constraint failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// LLM provider failure, transport error, or quota exhaustion
    #[error("LLM call failed: {0}")]
    LlmCall(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Extraction(_) | Self::Persistence(_) | Self::LlmCall(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::LlmCall(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if self.is_client_error() {
            tracing::debug!(status = status.as_u16(), %message, "Client error");
        } else {
            tracing::error!(status = status.as_u16(), %message, "Server error");
        }

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

/// Helper macro for creating NotFound errors
#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::errors::AppError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}
