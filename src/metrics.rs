//! Prometheus exposition (§4.9, §9-AMBIENT). Follows the project's existing
//! `prometheus_client` `Family<Label, Counter>` pattern for per-event
//! counters rather than hand-rolled atomics.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use tokio::sync::Mutex;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TransportLabel {
	pub transport: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DestinationLabel {
	pub destination: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct QueueLabel {
	pub queue: &'static str,
}

/// All counters the router and HTTP layer emit. Rendering requires walking
/// the whole registry, so that path takes an async lock; recording a single
/// counter does not touch it at all.
pub struct Metrics {
	registry: Mutex<Registry>,
	pub sessions_created: Counter,
	pub sessions_evicted: Counter,
	pub attachments: Family<TransportLabel, Counter>,
	pub detachments: Family<TransportLabel, Counter>,
	pub frames_routed: Family<DestinationLabel, Counter>,
	pub queue_drops: Family<QueueLabel, Counter>,
	pub post_writer_overwrites: Counter,
}

impl Default for Metrics {
	fn default() -> Self {
		let mut registry = Registry::default();

		let sessions_created = Counter::default();
		registry.register(
			"mcp_bridge_sessions_created",
			"Sessions created",
			sessions_created.clone(),
		);

		let sessions_evicted = Counter::default();
		registry.register(
			"mcp_bridge_sessions_evicted",
			"Sessions evicted by the idle sweep",
			sessions_evicted.clone(),
		);

		let attachments = Family::<TransportLabel, Counter>::default();
		registry.register(
			"mcp_bridge_attachments",
			"Transport attachments accepted, by transport",
			attachments.clone(),
		);

		let detachments = Family::<TransportLabel, Counter>::default();
		registry.register(
			"mcp_bridge_detachments",
			"Transport detachments observed, by transport",
			detachments.clone(),
		);

		let frames_routed = Family::<DestinationLabel, Counter>::default();
		registry.register(
			"mcp_bridge_frames_routed",
			"Frames routed, by destination",
			frames_routed.clone(),
		);

		let queue_drops = Family::<QueueLabel, Counter>::default();
		registry.register(
			"mcp_bridge_queue_drops",
			"Frames dropped by the drop-oldest overflow policy, by queue",
			queue_drops.clone(),
		);

		let post_writer_overwrites = Counter::default();
		registry.register(
			"mcp_bridge_post_writer_overwrites",
			"Request id collisions where a POST writer overwrote a still-pending one",
			post_writer_overwrites.clone(),
		);

		Self {
			registry: Mutex::new(registry),
			sessions_created,
			sessions_evicted,
			attachments,
			detachments,
			frames_routed,
			queue_drops,
			post_writer_overwrites,
		}
	}
}

impl Metrics {
	pub async fn render(&self) -> String {
		let registry = self.registry.lock().await;
		let mut buf = String::new();
		let _ = encode(&mut buf, &registry);
		buf
	}
}
