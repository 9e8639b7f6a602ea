//! `GET /ws` — the browser socket endpoint (C5).

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};

use crate::AppState;
use crate::http::session_key::ResolvedSessionKey;
use crate::metrics::TransportLabel;
use crate::router::route_from_browser;
use crate::session::SessionKey;
use crate::sink::{Sink, SinkEvent};

pub async fn upgrade(
	ws: WebSocketUpgrade,
	State(state): State<AppState>,
	ResolvedSessionKey(key): ResolvedSessionKey,
) -> Response {
	ws.on_upgrade(move |socket| run(socket, state, key))
}

async fn run(socket: WebSocket, state: AppState, key: SessionKey) {
	let (session, created) = state.registry.get_or_create(&key, state.config.queue_capacity);
	if created {
		state.metrics.sessions_created.inc();
	}
	state
		.metrics
		.attachments
		.get_or_create(&TransportLabel { transport: "browser_ws" })
		.inc();

	let (mut sender, mut receiver) = socket.split();
	let (sink, mut rx) = Sink::new();
	let generation = session.attach_browser_ws(sink);
	tracing::debug!(session = %key, generation, "browser socket attached");

	let writer_task = tokio::spawn(async move {
		while let Some(event) = rx.recv().await {
			match event {
				SinkEvent::Frame(frame) => {
					if sender.send(Message::Text(frame.into())).await.is_err() {
						break;
					}
				},
				SinkEvent::Close { code, reason } => {
					let _ = sender
						.send(Message::Close(Some(CloseFrame {
							code,
							reason: reason.into(),
						})))
						.await;
					break;
				},
			}
		}
	});

	while let Some(message) = receiver.next().await {
		match message {
			Ok(Message::Text(text)) => {
				route_from_browser(&session, text.to_string(), &state.metrics);
			},
			Ok(Message::Close(_)) | Err(_) => break,
			Ok(_) => {},
		}
	}

	writer_task.abort();
	session.detach_browser_ws(generation);
	state
		.metrics
		.detachments
		.get_or_create(&TransportLabel { transport: "browser_ws" })
		.inc();
	tracing::debug!(session = %key, generation, "browser socket detached");
}
