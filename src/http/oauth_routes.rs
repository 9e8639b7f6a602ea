//! OAuth 2.0 authorization-code flow, Dynamic Client Registration, and
//! authorization-server metadata discovery — the HTTP binding over
//! [`crate::oauth::OAuthStore`] (§4.7, §6).

use axum::Form;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::AppError;
use crate::session::default_session_key;

/// `GET /.well-known/oauth-authorization-server` — advertises the endpoints
/// and grants this bridge supports (RFC 8414).
pub async fn metadata() -> Json<serde_json::Value> {
	Json(json!({
		"issuer": "/",
		"authorization_endpoint": "/oauth/authorize",
		"token_endpoint": "/oauth/token",
		"registration_endpoint": "/register",
		"response_types_supported": ["code"],
		"grant_types_supported": ["authorization_code"],
		"token_endpoint_auth_methods_supported": ["none", "client_secret_post"],
	}))
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
	pub client_id: String,
	pub redirect_uri: String,
	#[serde(default)]
	pub state: String,
	#[serde(default = "default_session_key")]
	pub config: String,
}

fn escape_html(value: &str) -> String {
	value
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

/// `GET /oauth/authorize` — the user-facing consent page (§6, S6). Renders
/// a form that posts back to this same path; approving it mints the code.
pub async fn authorize_form(State(state): State<AppState>, Query(query): Query<AuthorizeQuery>) -> Result<Html<String>, AppError> {
	if state.oauth.client(&query.client_id).is_none() {
		return Err(AppError::BadRequest("unknown client_id".to_string()));
	}

	let html = format!(
		r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Authorize mcp-bridge</title><link rel="stylesheet" href="/static/consent.css"></head>
<body>
<main class="consent">
<h1>mcp-bridge</h1>
<p>A client is requesting access to your browser tool runtime session.</p>
<form method="post" action="/oauth/authorize">
<input type="hidden" name="client_id" value="{client_id}">
<input type="hidden" name="redirect_uri" value="{redirect_uri}">
<input type="hidden" name="state" value="{state}">
<input type="hidden" name="config" value="{config}">
<button type="submit">Authorize</button>
</form>
</main>
</body>
</html>"#,
		client_id = escape_html(&query.client_id),
		redirect_uri = escape_html(&query.redirect_uri),
		state = escape_html(&query.state),
		config = escape_html(&query.config),
	);
	Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeSubmission {
	pub client_id: String,
	pub redirect_uri: String,
	#[serde(default)]
	pub state: String,
	#[serde(default = "default_session_key")]
	pub config: String,
}

/// `POST /oauth/authorize` — approval. Mints the single-use code and
/// redirects to the client's `redirect_uri` with `code` and `state` (§6, S6).
pub async fn authorize_submit(State(state): State<AppState>, Form(form): Form<AuthorizeSubmission>) -> Result<Redirect, AppError> {
	let code = state
		.oauth
		.mint_auth_code(&form.client_id, &form.redirect_uri, form.config)
		.map_err(|_| AppError::BadRequest("unknown client_id or redirect_uri mismatch".to_string()))?;

	let separator = if form.redirect_uri.contains('?') { '&' } else { '?' };
	let mut location = format!("{}{separator}code={code}", form.redirect_uri);
	if !form.state.is_empty() {
		location.push_str("&state=");
		location.push_str(&form.state);
	}
	Ok(Redirect::to(&location))
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
	pub grant_type: String,
	pub code: String,
	pub redirect_uri: String,
	pub client_id: String,
}

/// `POST /oauth/token` — exchanges a single-use code for a bearer (§4.7, S6).
pub async fn token(State(state): State<AppState>, Form(req): Form<TokenRequest>) -> Response {
	if req.grant_type != "authorization_code" {
		return (
			StatusCode::BAD_REQUEST,
			Json(json!({ "error": "unsupported_grant_type" })),
		)
			.into_response();
	}

	match state.oauth.exchange_code(&req.client_id, &req.code, &req.redirect_uri) {
		Ok(access_token) => (
			StatusCode::OK,
			Json(json!({
				"access_token": access_token,
				"token_type": "Bearer",
				"expires_in": 3600,
			})),
		)
			.into_response(),
		Err(error) => {
			tracing::debug!(%error, "token exchange rejected");
			(StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response()
		},
	}
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
	#[serde(default)]
	pub redirect_uris: Vec<String>,
	#[serde(default)]
	pub client_name: Option<String>,
}

/// `POST /register` — Dynamic Client Registration (RFC 7591), returning a
/// synthetic client id and secret (§4.7).
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> impl IntoResponse {
	let registration = state.oauth.register_client(req.redirect_uris);
	(
		StatusCode::CREATED,
		Json(json!({
			"client_id": registration.client_id,
			"client_secret": registration.client_secret,
			"redirect_uris": registration.redirect_uris,
			"client_name": req.client_name,
			"token_endpoint_auth_method": "client_secret_post",
			"grant_types": ["authorization_code"],
			"response_types": ["code"],
		})),
	)
}
