use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::info;

use crate::replay::{LoadSummary, TranscriptSource};
use crate::server::{AppState, errors::AppError};

#[derive(Debug, Deserialize)]
pub struct LoadFileRequest {
    pub file: String,
}

/// Replaces the replayed transcript with structured transcript text from the request body.
///
/// An empty body is not a transcript and leaves the current one in place.
pub async fn load_inline(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<LoadSummary>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::EmptyTranscript);
    }
    info!("Loading inline transcript ({} bytes)", body.len());
    load(&state, TranscriptSource::Inline(body)).await
}

/// Replaces the replayed transcript with a delimited file from the transcript directory.
pub async fn load_file(
    State(state): State<AppState>,
    Json(request): Json<LoadFileRequest>,
) -> Result<Json<LoadSummary>, AppError> {
    info!("Loading transcript file {}", request.file);
    load(&state, TranscriptSource::File(request.file)).await
}

async fn load(state: &AppState, source: TranscriptSource) -> Result<Json<LoadSummary>, AppError> {
    let transcript = source.read(&state.transcript_dir).await?;
    Ok(Json(state.engine.load(&transcript)))
}
