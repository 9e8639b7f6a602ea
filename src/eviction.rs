//! Background idle-session sweep (§9-EVICT, §8 invariant 7).

use std::sync::Arc;
use std::time::Duration;

use crate::metrics::Metrics;
use crate::session::registry::SessionRegistry;

/// Runs forever, evicting sessions that have sat idle past
/// `idle_timeout` every `interval`. Spawned once from `main` alongside the
/// HTTP server; there is exactly one sweeper per process.
pub async fn run(registry: SessionRegistry, metrics: Arc<Metrics>, interval: Duration, idle_timeout: Duration) {
	let mut ticker = tokio::time::interval(interval);
	loop {
		ticker.tick().await;
		let evicted = registry.sweep(idle_timeout);
		if !evicted.is_empty() {
			tracing::info!(count = evicted.len(), "evicted idle sessions");
			metrics.sessions_evicted.inc_by(evicted.len() as u64);
		}
	}
}
