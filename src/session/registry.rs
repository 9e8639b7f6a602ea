use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::session::SessionKey;
use crate::session::core::SessionCore;

/// All live sessions, keyed by the opaque session key (§2, C2). Cloning a
/// `SessionRegistry` is cheap and shares the same map, matching how
/// `AppState` is cloned into every axum handler.
#[derive(Clone, Default)]
pub struct SessionRegistry {
	sessions: Arc<Mutex<HashMap<SessionKey, Arc<SessionCore>>>>,
}

impl SessionRegistry {
	/// Returns the existing session for `key`, or creates and inserts a
	/// fresh one with no attachments and empty queues. The `bool` reports
	/// whether this call was the one that created it, so callers can count
	/// session creation without a second lookup.
	pub fn get_or_create(&self, key: &SessionKey, queue_capacity: usize) -> (Arc<SessionCore>, bool) {
		let mut sessions = self.sessions.lock().unwrap();
		let mut created = false;
		let session = sessions
			.entry(key.clone())
			.or_insert_with(|| {
				created = true;
				Arc::new(SessionCore::new(key.clone(), queue_capacity))
			})
			.clone();
		(session, created)
	}

	pub fn get(&self, key: &SessionKey) -> Option<Arc<SessionCore>> {
		self.sessions.lock().unwrap().get(key).cloned()
	}

	/// Evicts every session idle for at least `timeout` (§9-EVICT). Returns
	/// the keys removed, for logging/metrics at the call site.
	pub fn sweep(&self, timeout: Duration) -> Vec<SessionKey> {
		let mut sessions = self.sessions.lock().unwrap();
		let idle_keys: Vec<SessionKey> = sessions
			.iter()
			.filter(|(_, session)| session.is_idle(timeout))
			.map(|(key, _)| key.clone())
			.collect();
		for key in &idle_keys {
			sessions.remove(key);
		}
		idle_keys
	}

	pub fn len(&self) -> usize {
		self.sessions.lock().unwrap().len()
	}
}
