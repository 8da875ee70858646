//! Error types for the dashboard backend.
//!
//! Every failure a handler can surface is a variant here, and the
//! `IntoResponse` impl maps each one to its HTTP status with the
//! `{"error": "..."}` JSON body the frontend expects.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::importer::ImportError;
use crate::models::ErrorResponse;
use crate::youtube::YouTubeError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Client-side input problems (bad file type, empty query)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// External video API transport or HTTP failure
    #[error("Upstream API error: {0}")]
    Upstream(String),

    /// Malformed spreadsheet upload
    #[error("Spreadsheet parse error: {0}")]
    Parse(String),

    /// Storage read/write failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Parse(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<YouTubeError> for ApiError {
    fn from(err: YouTubeError) -> Self {
        match err {
            YouTubeError::EmptyQuery => ApiError::BadRequest(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::Parse(err.to_string())
    }
}
