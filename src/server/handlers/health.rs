use axum::response::IntoResponse;

/// Liveness probe. The engine answers every command, so there is nothing else to check.
pub async fn health_check() -> impl IntoResponse {
    "healthy"
}
