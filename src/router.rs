//! The routing decisions themselves, on top of the primitives in
//! [`crate::session::core`] (§3, §4.6).

use crate::metrics::{DestinationLabel, Metrics, QueueLabel};
use crate::rpc::{FrameClass, RequestId, classify};
use crate::session::core::SessionCore;
use crate::sink::Sink;

/// A client POST body, possibly a JSON-RPC batch, bound for the browser
/// tool runtime (§3, §4.4). Delivery alone: whether this POST also becomes
/// a tracked response channel is a separate decision the caller makes via
/// [`register_post_writers`], since §4.4 branch 2 (no requests, or no
/// browser attached) must never leave an entry in `post_responses`.
pub fn route_from_client(session: &SessionCore, raw_body: &str, metrics: &Metrics) {
	let outcome = session.deliver_to_browser(raw_body.to_string());
	record_delivery(metrics, "browser_ws", "to_ws", outcome);
}

/// Remembers `writer` against every id in `ids` so the matching response
/// comes back to this exact POST instead of the session's client stream.
/// Callers must only invoke this on §4.4 branch 1 (requests present and the
/// browser socket currently attached) — registering unconditionally would
/// leave `post_responses` entries that only a matching (and possibly never
/// arriving) browser frame clears, which blocks idle eviction (§9-EVICT).
pub fn register_post_writers(session: &SessionCore, ids: &[RequestId], writer: &Sink, metrics: &Metrics) {
	for id in ids {
		if session.register_post_writer(id.clone(), writer.clone()) {
			metrics.post_writer_overwrites.inc();
		}
	}
}

/// A single frame off the browser WebSocket, bound for the MCP client.
/// Responses are routed to their originating POST writer when one is still
/// open; everything else (and any response whose writer has already
/// disconnected) falls through to the session's client stream or queue
/// (§3, §4.5, §4.6).
pub fn route_from_browser(session: &SessionCore, raw_frame: String, metrics: &Metrics) {
	if let FrameClass::Response(id) = classify(&raw_frame) {
		if let Some(writer) = session.take_post_writer(&id) {
			if writer.try_send_frame(raw_frame.clone()) {
				metrics
					.frames_routed
					.get_or_create(&DestinationLabel {
						destination: "post_writer",
					})
					.inc();
				return;
			}
		}
	}

	let outcome = session.deliver_to_client(raw_frame);
	record_delivery(metrics, "client_stream", "to_sse", outcome);
}

fn record_delivery(
	metrics: &Metrics,
	direct_destination: &'static str,
	queue_name: &'static str,
	outcome: Option<crate::session::core::EnqueueOutcome>,
) {
	match outcome {
		None => {
			metrics
				.frames_routed
				.get_or_create(&DestinationLabel {
					destination: direct_destination,
				})
				.inc();
		},
		Some(enqueue) => {
			metrics
				.frames_routed
				.get_or_create(&DestinationLabel { destination: "queue" })
				.inc();
			if enqueue.dropped_oldest {
				tracing::warn!(queue = queue_name, "queue full, dropped oldest frame");
				metrics
					.queue_drops
					.get_or_create(&QueueLabel { queue: queue_name })
					.inc();
			}
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::SinkEvent;

	#[test]
	fn response_routes_to_registered_post_writer() {
		let session = SessionCore::new("s".into(), 16);
		let metrics = Metrics::default();
		let (writer_sink, mut writer_rx) = Sink::new();

		route_from_client(&session, r#"{"jsonrpc":"2.0","id":1,"method":"tools/call"}"#, &metrics);
		register_post_writers(&session, &[RequestId::Num(1)], &writer_sink, &metrics);

		route_from_browser(
			&session,
			r#"{"jsonrpc":"2.0","id":1,"result":{}}"#.to_string(),
			&metrics,
		);

		match writer_rx.try_recv().unwrap() {
			SinkEvent::Frame(f) => assert!(f.contains("\"result\"")),
			_ => panic!("expected frame"),
		}
		assert!(session.take_post_writer(&RequestId::Num(1)).is_none());
	}

	#[test]
	fn response_with_no_writer_falls_back_to_client_stream() {
		let session = SessionCore::new("s".into(), 16);
		let metrics = Metrics::default();
		let (client_sink, mut client_rx) = Sink::new();
		session.attach_client_stream(client_sink);

		route_from_browser(
			&session,
			r#"{"jsonrpc":"2.0","id":99,"result":{}}"#.to_string(),
			&metrics,
		);

		match client_rx.try_recv().unwrap() {
			SinkEvent::Frame(f) => assert!(f.contains("99")),
			_ => panic!("expected frame"),
		}
	}

	#[test]
	fn server_initiated_request_from_browser_goes_to_client() {
		let session = SessionCore::new("s".into(), 16);
		let metrics = Metrics::default();
		let (client_sink, mut client_rx) = Sink::new();
		session.attach_client_stream(client_sink);

		route_from_browser(
			&session,
			r#"{"jsonrpc":"2.0","id":5,"method":"sampling/createMessage"}"#.to_string(),
			&metrics,
		);

		assert!(client_rx.try_recv().is_ok());
	}

	#[test]
	fn delivery_alone_never_registers_a_post_writer() {
		let session = SessionCore::new("s".into(), 16);
		let metrics = Metrics::default();

		route_from_client(&session, r#"{"jsonrpc":"2.0","id":1,"method":"tools/call"}"#, &metrics);

		assert!(session.take_post_writer(&RequestId::Num(1)).is_none());
		assert!(session.is_idle(std::time::Duration::from_secs(0)));
	}
}
