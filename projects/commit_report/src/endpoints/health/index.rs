use axum::{http::StatusCode, response::IntoResponse};

/// Axum handler: GET /health
///
/// Pure liveness probe; consults no upstream or configuration state.
pub async fn handler() -> impl IntoResponse {
	(StatusCode::OK, "OK")
}
