use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness probe; does not touch the store.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
