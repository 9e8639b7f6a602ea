//! A destination-agnostic outbound channel. Both the client-facing SSE
//! stream and the browser WebSocket are, from the router's point of view,
//! just a `Sink` that frames can be pushed into (§4.2).

use tokio::sync::mpsc;

/// Capacity of the internal channel backing a single `Sink`. Distinct from
/// the session's own `to_sse`/`to_ws` queue bound (§9-QUEUE): this is just
/// the handoff between the router and whichever task owns the transport.
const CHANNEL_CAPACITY: usize = 64;

/// One item flowing out of the router toward a transport task.
#[derive(Debug, Clone)]
pub enum SinkEvent {
	/// A single JSON-RPC frame to write out as-is.
	Frame(String),
	/// The transport should close the connection. `reason` is for logs only.
	Close { code: u16, reason: &'static str },
}

/// A cloneable handle to an outbound channel. Cloning is cheap (it clones
/// the underlying `mpsc::Sender`); every clone shares the same receiver.
#[derive(Clone)]
pub struct Sink {
	tx: mpsc::Sender<SinkEvent>,
}

impl Sink {
	/// Builds a fresh sink and its paired receiver. The receiver is handed to
	/// whatever task owns the physical transport (the SSE stream body, or
	/// the WebSocket write half).
	pub fn new() -> (Self, mpsc::Receiver<SinkEvent>) {
		let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
		(Self { tx }, rx)
	}

	/// Best-effort delivery: if the receiving task's channel is full or
	/// gone, the caller is expected to fall back to the session queue
	/// rather than block the router (§4.2).
	pub fn try_send_frame(&self, frame: String) -> bool {
		self.tx.try_send(SinkEvent::Frame(frame)).is_ok()
	}

	pub fn try_send_close(&self, code: u16, reason: &'static str) {
		let _ = self.tx.try_send(SinkEvent::Close { code, reason });
	}

	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}

	/// Whether `self` and `other` are handles to the same underlying channel
	/// — used to tell a still-current `post_responses` entry apart from one
	/// a later POST has already overwritten (§4.4, §9).
	pub fn same_channel(&self, other: &Sink) -> bool {
		self.tx.same_channel(&other.tx)
	}
}
