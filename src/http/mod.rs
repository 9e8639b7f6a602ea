//! The HTTP/WebSocket binding over the session-scoped router. Every handler
//! in here is a thin transport shim; the routing policy itself lives in
//! [`crate::router`] and [`crate::session`].

pub mod assets;
pub mod auth;
pub mod mcp;
pub mod oauth_routes;
pub mod session_key;
pub mod ws;

use axum::Router;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

fn cors_layer() -> CorsLayer {
	// All origins permitted, credentials included (§6) — `tower-http` refuses
	// to pair `allow_credentials(true)` with a wildcard anywhere, so the
	// origin is mirrored back per-request and methods/headers are spelled
	// out explicitly instead of `Any`.
	CorsLayer::new()
		.allow_origin(AllowOrigin::mirror_request())
		.allow_credentials(true)
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Builds the complete router for a given [`AppState`] (§6).
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/mcp", get(mcp::get_mcp).post(mcp::post_mcp))
		.route("/{config}/mcp", get(mcp::get_mcp).post(mcp::post_mcp))
		.route("/ws", get(ws::upgrade))
		.route("/.well-known/oauth-authorization-server", get(oauth_routes::metadata))
		.route(
			"/oauth/authorize",
			get(oauth_routes::authorize_form).post(oauth_routes::authorize_submit),
		)
		.route("/oauth/token", post(oauth_routes::token))
		.route("/register", post(oauth_routes::register))
		.route("/metrics", get(assets::metrics))
		.route("/healthz", get(assets::healthz))
		.nest_service("/static", assets::static_service())
		.layer(cors_layer())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
