//! Ambient HTTP surface that never touches session routing: Prometheus
//! exposition, a liveness probe, and the static files backing the OAuth
//! consent page (§4.8, §4.9, §6).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::AppState;

/// `GET /metrics` (§4.9).
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
	(StatusCode::OK, state.metrics.render().await)
}

/// `GET /healthz` (§6, ambient).
pub async fn healthz() -> Json<serde_json::Value> {
	Json(json!({ "status": "ok" }))
}

/// Backing service for `/static/*`, grounded on the project's existing
/// `tower-http` file-serving approach rather than a hand-rolled reader
/// (§4.8).
pub fn static_service() -> ServeDir {
	ServeDir::new("static")
}
