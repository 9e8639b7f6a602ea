//! `GET`/`POST /mcp` — the client stream endpoint (C3) and the client
//! ingress endpoint (C4).

use std::convert::Infallible;
use std::pin::Pin;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::AppState;
use crate::error::AppError;
use crate::http::auth::AuthenticatedSession;
use crate::metrics::TransportLabel;
use crate::router::{register_post_writers, route_from_client};
use crate::rpc::request_ids_in_body;
use crate::sink::{Sink, SinkEvent};
use crate::stream_guard::GuardedStream;

type BoxedEventStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;
type Cleanup = Box<dyn FnMut() + Send>;

/// Turns a raw [`SinkEvent`] receiver into the SSE item stream shared by
/// both the long-lived client stream and a POST's response stream: frames
/// become `data:` events, a `Close` ends the stream (§4.3, §4.4).
fn frame_events(rx: mpsc::Receiver<SinkEvent>) -> impl Stream<Item = Result<Event, Infallible>> + Send {
	ReceiverStream::new(rx)
		.take_while(|event| futures::future::ready(!matches!(event, SinkEvent::Close { .. })))
		.filter_map(|event| {
			futures::future::ready(match event {
				SinkEvent::Frame(frame) => Some(Ok(Event::default().data(frame))),
				SinkEvent::Close { .. } => None,
			})
		})
}

/// `GET /mcp` (and `/{config}/mcp`): attaches (or replaces) this session's
/// client stream and drains whatever is queued in `to_sse` (§4.3).
pub async fn get_mcp(State(state): State<AppState>, AuthenticatedSession(key): AuthenticatedSession) -> impl IntoResponse {
	let (session, created) = state.registry.get_or_create(&key, state.config.queue_capacity);
	if created {
		state.metrics.sessions_created.inc();
	}
	state
		.metrics
		.attachments
		.get_or_create(&TransportLabel {
			transport: "client_stream",
		})
		.inc();

	let (sink, rx) = Sink::new();
	let generation = session.attach_client_stream(sink);
	tracing::debug!(session = %key, generation, "client stream attached");

	let opening_comment = futures::stream::once(futures::future::ready(Ok(Event::default().comment(""))));
	let body: BoxedEventStream = Box::pin(opening_comment.chain(frame_events(rx)));

	let registry = state.registry.clone();
	let metrics = state.metrics.clone();
	let cleanup: Cleanup = Box::new(move || {
		if let Some(session) = registry.get(&key) {
			session.detach_client_stream(generation);
		}
		metrics
			.detachments
			.get_or_create(&TransportLabel {
				transport: "client_stream",
			})
			.inc();
	});

	Sse::new(GuardedStream::new(body, cleanup)).keep_alive(KeepAlive::new())
}

/// The two shapes a `POST /mcp` response can take (§4.4): an immediate
/// acknowledgement, or an event-stream held open for the matching
/// response(s).
pub enum PostMcpResponse {
	Accepted,
	Streaming(Sse<GuardedStream<BoxedEventStream, Cleanup>>),
}

impl IntoResponse for PostMcpResponse {
	fn into_response(self) -> Response {
		match self {
			PostMcpResponse::Accepted => StatusCode::ACCEPTED.into_response(),
			PostMcpResponse::Streaming(sse) => sse.into_response(),
		}
	}
}

/// `POST /mcp` (and `/{config}/mcp`): forwards the body to the browser side
/// and decides the response policy (§4.4).
pub async fn post_mcp(
	State(state): State<AppState>,
	AuthenticatedSession(key): AuthenticatedSession,
	body: String,
) -> Result<PostMcpResponse, AppError> {
	if serde_json::from_str::<serde_json::Value>(&body).is_err() {
		return Err(AppError::BadRequest("request body is not valid JSON".to_string()));
	}

	let (session, created) = state.registry.get_or_create(&key, state.config.queue_capacity);
	if created {
		state.metrics.sessions_created.inc();
	}
	let request_ids = request_ids_in_body(&body);
	let browser_live = session.browser_attached();

	route_from_client(&session, &body, &state.metrics);

	if request_ids.is_empty() || !browser_live {
		return Ok(PostMcpResponse::Accepted);
	}

	// Only this branch (requests present, browser attached) may hold a
	// `post_responses` entry open — registering on the `202` branch above
	// would leave it dangling until a browser frame that may never answer
	// it clears it, which blocks idle eviction (§4.4, §9-EVICT).
	let (writer, rx) = Sink::new();
	register_post_writers(&session, &request_ids, &writer, &state.metrics);

	let body_stream: BoxedEventStream = Box::pin(frame_events(rx));

	let registry = state.registry.clone();
	let cleanup: Cleanup = Box::new(move || {
		if let Some(session) = registry.get(&key) {
			for id in &request_ids {
				session.clear_post_writer_if_current(id, &writer);
			}
		}
	});

	Ok(PostMcpResponse::Streaming(Sse::new(GuardedStream::new(body_stream, cleanup))))
}
