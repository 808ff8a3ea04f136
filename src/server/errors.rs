use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::replay::SourceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Command is not a hex string: {0}")]
    InvalidCommand(String),
    #[error("Transcript is empty")]
    EmptyTranscript,
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCommand(_) | AppError::EmptyTranscript => StatusCode::BAD_REQUEST,
            AppError::Source(SourceError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            AppError::Source(SourceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Source(SourceError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<hex::FromHexError> for AppError {
    fn from(error: hex::FromHexError) -> Self {
        AppError::InvalidCommand(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!("Rejected request: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
