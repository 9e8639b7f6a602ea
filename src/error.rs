use axum::Json;
use axum::http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors surfaced across the HTTP boundary. Follows the project's existing
/// pattern of a `thiserror` enum with a hand-written `IntoResponse` impl
/// rather than threading `anyhow::Error` into client-visible responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("malformed request body: {0}")]
	BadRequest(String),

	#[error("missing or invalid bearer token")]
	Unauthorized {
		realm: String,
		authorization_uri: String,
		token_uri: String,
	},
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		match self {
			AppError::BadRequest(message) => {
				tracing::debug!(%message, "rejecting malformed request");
				(StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
			},
			AppError::Unauthorized {
				realm,
				authorization_uri,
				token_uri,
			} => {
				let challenge = format!(
					r#"Bearer realm="{realm}", authorization_uri="{authorization_uri}", token_uri="{token_uri}""#
				);
				let mut response = StatusCode::UNAUTHORIZED.into_response();
				if let Ok(value) = HeaderValue::from_str(&challenge) {
					response.headers_mut().insert(WWW_AUTHENTICATE, value);
				}
				response
			},
		}
	}
}
