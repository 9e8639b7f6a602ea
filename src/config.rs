use std::time::Duration;

use clap::Parser;

/// Default listening port, per the single `PORT` environment variable the
/// router recognizes.
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Runtime configuration. Loaded from the environment, with an optional CLI
/// override for local development (mirrors the project's existing
/// `clap::Parser` + env-driven config split).
#[derive(Clone, Debug)]
pub struct Config {
	pub port: u16,
	/// How long a session may sit with no attachments and empty queues
	/// before the idle sweep evicts it.
	pub idle_session_timeout: Duration,
	/// How often the idle sweep runs.
	pub sweep_interval: Duration,
	/// Capacity of `to_sse` and `to_ws` before the drop-oldest policy kicks in.
	pub queue_capacity: usize,
}

impl Config {
	pub fn from_env() -> Self {
		let port = std::env::var("PORT")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(DEFAULT_PORT);
		let idle_session_timeout = std::env::var("MCP_BRIDGE_IDLE_TIMEOUT_SECS")
			.ok()
			.and_then(|v| v.parse().ok())
			.map(Duration::from_secs)
			.unwrap_or(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS));
		let sweep_interval = std::env::var("MCP_BRIDGE_SWEEP_INTERVAL_SECS")
			.ok()
			.and_then(|v| v.parse().ok())
			.map(Duration::from_secs)
			.unwrap_or(Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS));
		let queue_capacity = std::env::var("MCP_BRIDGE_QUEUE_CAPACITY")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(DEFAULT_QUEUE_CAPACITY);
		Self {
			port,
			idle_session_timeout,
			sweep_interval,
			queue_capacity,
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			port: DEFAULT_PORT,
			idle_session_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
			sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
		}
	}
}

/// CLI surface. Only `--port` is exposed: the environment variable remains
/// authoritative for containerized deployment, this is a convenience for
/// running the bridge locally.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
	/// Override the listening port (takes precedence over $PORT)
	#[arg(long, value_name = "port")]
	pub port: Option<u16>,
}
