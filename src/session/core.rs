use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::rpc::RequestId;
use crate::session::SessionKey;
use crate::sink::Sink;

/// Close code sent to a displaced attachment — "last writer wins" (§3
/// invariant 1, §4.5). Meaningless to an SSE stream (there's no close frame
/// to carry it), but `frame_events` only looks at the `Close` variant, not
/// its payload, so one constant serves both transports.
const CLOSE_CODE_REPLACED: u16 = 4000;

/// Outcome of pushing a frame into one of the bounded spillover queues.
/// Mirrors the project's drop-oldest overflow policy (§9-QUEUE).
pub struct EnqueueOutcome {
	pub dropped_oldest: bool,
}

struct Attachment {
	generation: u64,
	sink: Sink,
}

struct Inner {
	client_stream: Option<Attachment>,
	browser_ws: Option<Attachment>,
	next_generation: u64,
	post_writers: HashMap<RequestId, Sink>,
	to_sse: VecDeque<String>,
	to_ws: VecDeque<String>,
	last_active: Instant,
	queue_capacity: usize,
}

/// One session's full routing state, guarded by a single lock. Every
/// operation is a short, non-blocking critical section — sends into a
/// `Sink` are `try_send`, never `.await`, so the lock is never held across
/// an await point (§4.2, §4.6).
pub struct SessionCore {
	pub key: SessionKey,
	inner: Mutex<Inner>,
}

impl SessionCore {
	pub fn new(key: SessionKey, queue_capacity: usize) -> Self {
		Self {
			key,
			inner: Mutex::new(Inner {
				client_stream: None,
				browser_ws: None,
				next_generation: 0,
				post_writers: HashMap::new(),
				to_sse: VecDeque::new(),
				to_ws: VecDeque::new(),
				last_active: Instant::now(),
				queue_capacity,
			}),
		}
	}

	pub fn touch(&self) {
		self.inner.lock().unwrap().last_active = Instant::now();
	}

	/// Attaches a new client SSE stream, replacing any previous one
	/// (last-writer-wins, §3 invariant 2). Drains whatever is queued in
	/// `to_sse` into the new sink immediately, oldest first, stopping (and
	/// leaving the remainder queued) the moment the sink can't keep up.
	/// Returns the generation token the caller must present to
	/// [`Self::detach_client_stream`].
	pub fn attach_client_stream(&self, sink: Sink) -> u64 {
		let mut inner = self.inner.lock().unwrap();
		let generation = inner.next_generation;
		inner.next_generation += 1;
		inner.last_active = Instant::now();
		if let Some(previous) = inner.client_stream.take() {
			previous.sink.try_send_close(CLOSE_CODE_REPLACED, "replaced by a newer client stream");
		}
		Self::drain_into(&mut inner.to_sse, &sink);
		inner.client_stream = Some(Attachment { generation, sink });
		generation
	}

	pub fn attach_browser_ws(&self, sink: Sink) -> u64 {
		let mut inner = self.inner.lock().unwrap();
		let generation = inner.next_generation;
		inner.next_generation += 1;
		inner.last_active = Instant::now();
		if let Some(previous) = inner.browser_ws.take() {
			previous.sink.try_send_close(CLOSE_CODE_REPLACED, "replaced by a newer browser socket");
		}
		Self::drain_into(&mut inner.to_ws, &sink);
		inner.browser_ws = Some(Attachment { generation, sink });
		generation
	}

	/// Clears the client stream attachment only if `generation` is still the
	/// current one — a stream that was already superseded by a newer attach
	/// must not clobber it on its own (delayed) disconnect cleanup.
	pub fn detach_client_stream(&self, generation: u64) {
		let mut inner = self.inner.lock().unwrap();
		if matches!(&inner.client_stream, Some(a) if a.generation == generation) {
			inner.client_stream = None;
		}
	}

	pub fn detach_browser_ws(&self, generation: u64) {
		let mut inner = self.inner.lock().unwrap();
		if matches!(&inner.browser_ws, Some(a) if a.generation == generation) {
			inner.browser_ws = None;
		}
	}

	fn drain_into(queue: &mut VecDeque<String>, sink: &Sink) {
		while let Some(frame) = queue.pop_front() {
			if !sink.try_send_frame(frame.clone()) {
				queue.push_front(frame);
				break;
			}
		}
	}

	fn enqueue_bounded(queue: &mut VecDeque<String>, capacity: usize, frame: String) -> EnqueueOutcome {
		let mut dropped_oldest = false;
		if queue.len() >= capacity {
			queue.pop_front();
			dropped_oldest = true;
		}
		queue.push_back(frame);
		EnqueueOutcome { dropped_oldest }
	}

	/// Delivers a frame bound for the client. If a client stream is
	/// attached and keeping up, it goes straight out; otherwise it spills
	/// into the bounded `to_sse` queue (§4.2, §9-QUEUE).
	pub fn deliver_to_client(&self, frame: String) -> Option<EnqueueOutcome> {
		let mut inner = self.inner.lock().unwrap();
		inner.last_active = Instant::now();
		if let Some(attachment) = &inner.client_stream {
			if attachment.sink.try_send_frame(frame.clone()) {
				return None;
			}
		}
		let capacity = inner.queue_capacity;
		Some(Self::enqueue_bounded(&mut inner.to_sse, capacity, frame))
	}

	/// Delivers a frame bound for the browser tool runtime. Same shape as
	/// [`Self::deliver_to_client`] but against `to_ws` / `browser_ws`.
	pub fn deliver_to_browser(&self, frame: String) -> Option<EnqueueOutcome> {
		let mut inner = self.inner.lock().unwrap();
		inner.last_active = Instant::now();
		if let Some(attachment) = &inner.browser_ws {
			if attachment.sink.try_send_frame(frame.clone()) {
				return None;
			}
		}
		let capacity = inner.queue_capacity;
		Some(Self::enqueue_bounded(&mut inner.to_ws, capacity, frame))
	}

	/// Records which POST writer introduced `id`, so its eventual response
	/// can be routed back to that exact writer instead of the session's
	/// general client stream (§3, §4.4). Last writer for a given id wins;
	/// returns whether this overwrote a prior entry (id reuse, logged by
	/// the caller).
	pub fn register_post_writer(&self, id: RequestId, sink: Sink) -> bool {
		let mut inner = self.inner.lock().unwrap();
		inner.post_writers.insert(id, sink).is_some()
	}

	/// Takes (and removes) the POST writer registered for `id`, if any and
	/// if it is still open. A response is delivered at most once via this
	/// path (§3 invariant 3).
	pub fn take_post_writer(&self, id: &RequestId) -> Option<Sink> {
		let mut inner = self.inner.lock().unwrap();
		match inner.post_writers.remove(id) {
			Some(sink) if !sink.is_closed() => Some(sink),
			_ => None,
		}
	}

	pub fn has_attachments(&self) -> bool {
		let inner = self.inner.lock().unwrap();
		inner.client_stream.is_some() || inner.browser_ws.is_some()
	}

	/// Whether a browser socket is currently attached and keeping up (§4.4
	/// branch 1 needs this to decide the POST response policy).
	pub fn browser_attached(&self) -> bool {
		let inner = self.inner.lock().unwrap();
		matches!(&inner.browser_ws, Some(a) if !a.sink.is_closed())
	}

	/// Removes the mapping for `id` only if it still points at `writer` —
	/// used when a POST event-stream closes, so a later POST that overwrote
	/// this id's entry is never clobbered by the earlier writer's cleanup
	/// (§4.4, §9).
	pub fn clear_post_writer_if_current(&self, id: &RequestId, writer: &Sink) {
		let mut inner = self.inner.lock().unwrap();
		if matches!(inner.post_writers.get(id), Some(current) if current.same_channel(writer)) {
			inner.post_writers.remove(id);
		}
	}

	/// A session is a candidate for eviction once it has no live
	/// attachments, nothing queued, and has not been touched within
	/// `timeout` (§9-EVICT, §8 invariant 7).
	pub fn is_idle(&self, timeout: Duration) -> bool {
		let inner = self.inner.lock().unwrap();
		inner.client_stream.is_none()
			&& inner.browser_ws.is_none()
			&& inner.to_sse.is_empty()
			&& inner.to_ws.is_empty()
			&& inner.post_writers.is_empty()
			&& inner.last_active.elapsed() >= timeout
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn queues_when_unattached_then_flushes_on_attach() {
		let session = SessionCore::new("s".into(), 4);
		let outcome = session.deliver_to_client("frame-1".to_string());
		assert!(outcome.is_some() && !outcome.unwrap().dropped_oldest);

		let (sink, mut rx) = Sink::new();
		session.attach_client_stream(sink);
		let received = rx.try_recv().unwrap();
		match received {
			crate::sink::SinkEvent::Frame(f) => assert_eq!(f, "frame-1"),
			_ => panic!("expected frame"),
		}
	}

	#[test]
	fn drop_oldest_once_queue_is_full() {
		let session = SessionCore::new("s".into(), 2);
		session.deliver_to_client("a".to_string());
		session.deliver_to_client("b".to_string());
		let outcome = session.deliver_to_client("c".to_string()).unwrap();
		assert!(outcome.dropped_oldest);

		let (sink, mut rx) = Sink::new();
		session.attach_client_stream(sink);
		let mut frames = Vec::new();
		while let Ok(crate::sink::SinkEvent::Frame(f)) = rx.try_recv() {
			frames.push(f);
		}
		assert_eq!(frames, vec!["b".to_string(), "c".to_string()]);
	}

	#[test]
	fn stale_generation_does_not_clobber_newer_attachment() {
		let session = SessionCore::new("s".into(), 4);
		let (sink1, _rx1) = Sink::new();
		let gen1 = session.attach_client_stream(sink1);
		let (sink2, _rx2) = Sink::new();
		let _gen2 = session.attach_client_stream(sink2);

		session.detach_client_stream(gen1);
		assert!(session.has_attachments());
	}

	#[test]
	fn post_writer_round_trips_once() {
		let session = SessionCore::new("s".into(), 4);
		let (sink, _rx) = Sink::new();
		let overwrote = session.register_post_writer(RequestId::Num(1), sink);
		assert!(!overwrote);
		assert!(session.take_post_writer(&RequestId::Num(1)).is_some());
		assert!(session.take_post_writer(&RequestId::Num(1)).is_none());
	}

	#[test]
	fn idle_requires_no_attachments_and_empty_queues() {
		let session = SessionCore::new("s".into(), 4);
		assert!(session.is_idle(Duration::from_secs(0)));
		session.deliver_to_client("x".to_string());
		assert!(!session.is_idle(Duration::from_secs(0)));
	}

	#[test]
	fn browser_attached_reflects_live_socket_only() {
		let session = SessionCore::new("s".into(), 4);
		assert!(!session.browser_attached());
		let (sink, rx) = Sink::new();
		session.attach_browser_ws(sink);
		assert!(session.browser_attached());
		drop(rx);
		assert!(!session.browser_attached());
	}

	#[test]
	fn clear_post_writer_if_current_ignores_overwritten_entry() {
		let session = SessionCore::new("s".into(), 4);
		let (first, _rx1) = Sink::new();
		let (second, _rx2) = Sink::new();
		session.register_post_writer(RequestId::Num(1), first.clone());
		session.register_post_writer(RequestId::Num(1), second.clone());

		session.clear_post_writer_if_current(&RequestId::Num(1), &first);
		assert!(session.take_post_writer(&RequestId::Num(1)).is_some());
	}

	#[test]
	fn clear_post_writer_if_current_removes_matching_entry() {
		let session = SessionCore::new("s".into(), 4);
		let (writer, _rx) = Sink::new();
		session.register_post_writer(RequestId::Num(1), writer.clone());
		session.clear_post_writer_if_current(&RequestId::Num(1), &writer);
		assert!(session.take_post_writer(&RequestId::Num(1)).is_none());
	}
}
