use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::replay::DeactivationReason;
use crate::server::AppState;

/// Deactivation reason as sent by the harness: a platform code or a name.
/// Any other value, or no value at all, counts as a deselection.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReasonValue {
    Code(i64),
    Name(String),
    Other(serde_json::Value),
}

impl Default for ReasonValue {
    fn default() -> Self {
        ReasonValue::Other(serde_json::Value::Null)
    }
}

impl From<ReasonValue> for DeactivationReason {
    fn from(value: ReasonValue) -> Self {
        match value {
            ReasonValue::Code(code) => DeactivationReason::from_code(code),
            ReasonValue::Name(name) => DeactivationReason::from_name(&name),
            ReasonValue::Other(_) => DeactivationReason::Deselected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    #[serde(default)]
    pub reason: ReasonValue,
}

#[derive(Debug, Deserialize)]
pub struct PollingFramesRequest {
    pub frames: Vec<String>,
}

pub async fn deactivate_handler(
    State(state): State<AppState>,
    Json(request): Json<DeactivateRequest>,
) -> StatusCode {
    state.engine.deactivate(request.reason.into());
    StatusCode::NO_CONTENT
}

pub async fn polling_frames_handler(
    State(state): State<AppState>,
    Json(request): Json<PollingFramesRequest>,
) -> StatusCode {
    state.engine.record_polling_frames(request.frames.as_slice());
    StatusCode::NO_CONTENT
}
