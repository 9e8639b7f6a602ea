//! Disconnect detection for SSE response bodies.
//!
//! axum/hyper drop the body `Stream` of an in-flight response when the
//! peer disconnects; the stream is never polled to completion and never
//! yields a terminal `None`. The only reliable signal is the `Drop` of the
//! stream itself, so cleanup has to live in a `Drop` impl — the same shape
//! as the project's existing deferred-recording guard in its metrics layer.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

/// Wraps an `Unpin` stream `S` and runs `on_drop` exactly once when the
/// wrapper itself is dropped, regardless of whether the inner stream ran to
/// completion or was abandoned mid-flight by a disconnected peer.
pub struct GuardedStream<S, F: FnMut()> {
	inner: S,
	on_drop: Option<F>,
}

impl<S, F: FnMut()> GuardedStream<S, F> {
	pub fn new(inner: S, on_drop: F) -> Self {
		Self {
			inner,
			on_drop: Some(on_drop),
		}
	}
}

impl<S: Stream + Unpin, F: FnMut() + Unpin> Stream for GuardedStream<S, F> {
	type Item = S::Item;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner).poll_next(cx)
	}
}

impl<S, F: FnMut()> Drop for GuardedStream<S, F> {
	fn drop(&mut self) {
		if let Some(mut f) = self.on_drop.take() {
			f();
		}
	}
}
