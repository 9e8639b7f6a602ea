//! Reverse proxy bridging the MCP Streamable HTTP transport to a
//! browser-hosted tool runtime reached over a WebSocket.
//!
//! The session-scoped duplex router (see [`session`] and [`router`]) is the
//! core of this crate; everything under [`http`] and [`oauth`] is a thin
//! transport binding on top of it.

pub mod config;
pub mod error;
pub mod eviction;
pub mod http;
pub mod metrics;
pub mod oauth;
pub mod rpc;
pub mod router;
pub mod session;
pub mod sink;
pub mod stream_guard;
pub mod telemetry;

use std::sync::Arc;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::oauth::OAuthStore;
use crate::session::registry::SessionRegistry;

/// Shared state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
	pub registry: SessionRegistry,
	pub oauth: OAuthStore,
	pub metrics: Arc<Metrics>,
	pub config: Config,
}

impl AppState {
	pub fn new(config: Config) -> Self {
		Self {
			registry: SessionRegistry::default(),
			oauth: OAuthStore::default(),
			metrics: Arc::new(Metrics::default()),
			config,
		}
	}
}

/// Builds the full axum [`axum::Router`] for the given state. Split out of
/// `main` so integration tests can drive the exact same routing table.
pub fn build_app(state: AppState) -> axum::Router {
	http::router(state)
}
