use std::net::SocketAddr;

use clap::Parser;
use mcp_bridge::config::{Args, Config};
use mcp_bridge::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	mcp_bridge::telemetry::init();

	let args = Args::parse();
	let mut config = Config::from_env();
	if let Some(port) = args.port {
		config.port = port;
	}

	let state = AppState::new(config.clone());

	tokio::spawn(mcp_bridge::eviction::run(
		state.registry.clone(),
		state.metrics.clone(),
		config.sweep_interval,
		config.idle_session_timeout,
	));

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = tokio::net::TcpListener::bind(addr).await?;
	tracing::info!(%addr, "mcp-bridge listening");

	axum::serve(listener, build_app(state)).await?;
	Ok(())
}
