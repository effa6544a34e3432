use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    #[error("Title not found: {0}")]
    UnknownTitle(String),

    #[error("Catalog has {size} titles, at least {required} are needed")]
    InsufficientCatalog { size: usize, required: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Poster fetch failed: {0}")]
    PosterFetch(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnknownTitle(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientCatalog { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ArtifactUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::PosterFetch(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::UnknownTitle(title) => format!("Title not found: {}", title),
            AppError::InvalidInput(msg) | AppError::PosterFetch(msg) => msg,
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
