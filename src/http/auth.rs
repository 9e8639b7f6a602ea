//! Bearer-token admission for the client-facing endpoints (§4.7).
//!
//! The router itself does not care how a session was admitted — only that,
//! for a given session key, a bearer has been issued. This extractor is the
//! one place that contract is enforced: it resolves the session key the
//! same way every other handler does, then requires the `Authorization`
//! header to carry a bearer token that the [`crate::oauth::OAuthStore`]
//! resolves back to that exact key.

use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::AppState;
use crate::error::AppError;
use crate::http::session_key::ResolvedSessionKey;
use crate::session::SessionKey;

/// The session key a caller authenticated into, carried by every handler
/// that requires a bearer (§6, `/mcp`).
pub struct AuthenticatedSession(pub SessionKey);

impl FromRequestParts<AppState> for AuthenticatedSession {
	type Rejection = AppError;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let ResolvedSessionKey(key) = ResolvedSessionKey::from_request_parts(parts, state)
			.await
			.expect("ResolvedSessionKey extraction is infallible");

		let host = parts
			.headers
			.get(HOST)
			.and_then(|value| value.to_str().ok())
			.unwrap_or("localhost");
		let challenge = || AppError::Unauthorized {
			realm: "mcp-bridge".to_string(),
			authorization_uri: format!("http://{host}/oauth/authorize"),
			token_uri: format!("http://{host}/oauth/token"),
		};

		let TypedHeader(Authorization(bearer)) = parts
			.extract::<TypedHeader<Authorization<Bearer>>>()
			.await
			.map_err(|_| challenge())?;

		let resolved = state.oauth.resolve_token(bearer.token()).ok_or_else(challenge)?;
		if resolved != key {
			return Err(challenge());
		}

		Ok(Self(key))
	}
}
