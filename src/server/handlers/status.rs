use axum::{Json, extract::State};

use crate::replay::ReplayStatus;
use crate::server::AppState;

/// Full transaction log as plain text.
pub async fn log_handler(State(state): State<AppState>) -> String {
    state.engine.current_log()
}

pub async fn status_handler(State(state): State<AppState>) -> Json<ReplayStatus> {
    Json(state.engine.status())
}
