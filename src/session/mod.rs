//! The session-scoped duplex router core (§3).
//!
//! A [`core::SessionCore`] is the single point of truth for one session: its
//! two attachments (client SSE stream, browser WebSocket), its two bounded
//! spillover queues, and the response-affinity map that remembers which
//! POST writer introduced which request id.

pub mod core;
pub mod registry;

pub use core::SessionCore;
pub use registry::SessionRegistry;

/// Session keys are opaque strings: either the caller-supplied `config`
/// path segment / query parameter, or the literal `"global"` (§2, C2).
pub type SessionKey = String;

pub const GLOBAL_SESSION_KEY: &str = "global";

/// `serde(default = ...)` helper for form fields that scope an OAuth grant
/// to a session key, defaulting to [`GLOBAL_SESSION_KEY`] like every other
/// session key extraction point (§6).
pub fn default_session_key() -> SessionKey {
	GLOBAL_SESSION_KEY.to_string()
}
