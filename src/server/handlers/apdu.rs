use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::replay::canonicalize;
use crate::server::{AppState, errors::AppError};

/// A command frame received from the reader. `null` stands for a missing frame.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApduRequest {
    pub command: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApduResponse {
    pub response: String,
}

/// Answers one command frame with the next replayed response.
pub async fn apdu_handler(
    State(state): State<AppState>,
    Json(request): Json<ApduRequest>,
) -> Result<Json<ApduResponse>, AppError> {
    let command = request
        .command
        .map(|command| hex::decode(canonicalize(&command)))
        .transpose()?;

    let response = state.engine.handle_command(command.as_deref());
    Ok(Json(ApduResponse {
        response: hex::encode(response),
    }))
}
