//! Session key resolution: path segment, then query parameter, then the
//! literal `"global"` (§2, C2). One extractor shared by every handler so
//! the precedence is defined in exactly one place.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;

use crate::session::{GLOBAL_SESSION_KEY, SessionKey};

pub struct ResolvedSessionKey(pub SessionKey);

impl<S> FromRequestParts<S> for ResolvedSessionKey
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		if let Ok(Path(params)) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await
			&& let Some(config) = params.get("config")
		{
			return Ok(Self(config.clone()));
		}

		if let Ok(Query(params)) = Query::<HashMap<String, String>>::from_request_parts(parts, state).await
			&& let Some(config) = params.get("config")
		{
			return Ok(Self(config.clone()));
		}

		Ok(Self(GLOBAL_SESSION_KEY.to_string()))
	}
}
