//! Structured logging setup, grounded in the project's existing `main.rs`
//! initialization: `tracing-subscriber` with an `EnvFilter`, writing to
//! stderr so stdout stays free for anything piping the process's output.

use tracing_subscriber::EnvFilter;

/// Reads `RUST_LOG` (falling back to `info`), and installs the global
/// `tracing` subscriber. Must be called once, before anything else logs.
pub fn init() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(false)
		.init();
}
