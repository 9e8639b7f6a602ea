//! Routing-relevant JSON-RPC 2.0 frame shape. The router never validates
//! JSON-RPC semantics beyond what is needed to pick a destination (§3).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-RPC request id: string or integer, per the wire spec. Hashable so
/// it can key the `post_responses` map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
	Num(i64),
	Str(String),
}

impl std::fmt::Display for RequestId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RequestId::Num(n) => write!(f, "{n}"),
			RequestId::Str(s) => write!(f, "{s}"),
		}
	}
}

fn request_id_from_value(value: &Value) -> Option<RequestId> {
	match value {
		Value::Number(n) => n.as_i64().map(RequestId::Num),
		Value::String(s) => Some(RequestId::Str(s.clone())),
		_ => None,
	}
}

/// The three ways a frame coming off the browser socket can be routed.
/// `Passthrough` covers both "valid JSON but neither a response nor a
/// request/notification shape" and "not JSON at all" — both are logged and
/// best-effort forwarded to the client stream (§3, §4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameClass {
	Response(RequestId),
	RequestOrNotification,
	Passthrough,
}

/// Classify a single frame by shape alone. Never fails: unparseable text is
/// itself a valid classification (`Passthrough`).
pub fn classify(raw: &str) -> FrameClass {
	let Ok(value) = serde_json::from_str::<Value>(raw) else {
		return FrameClass::Passthrough;
	};
	classify_value(&value)
}

fn classify_value(value: &Value) -> FrameClass {
	let Value::Object(map) = value else {
		return FrameClass::Passthrough;
	};
	if map.contains_key("method") {
		return FrameClass::RequestOrNotification;
	}
	match map.get("id") {
		Some(id) => match request_id_from_value(id) {
			Some(id) => FrameClass::Response(id),
			None => FrameClass::Passthrough,
		},
		None => FrameClass::Passthrough,
	}
}

/// Extracts the ids of every **request** (both `id` and `method` present) in
/// a client→server POST body, which may be a single frame or a batch (§4.4).
/// Notifications (`method` with no `id`) are forwarded but never tracked in
/// `post_responses`.
pub fn request_ids_in_body(raw: &str) -> Vec<RequestId> {
	let Ok(value) = serde_json::from_str::<Value>(raw) else {
		return Vec::new();
	};
	let frames: Vec<&Value> = match &value {
		Value::Array(items) => items.iter().collect(),
		other => vec![other],
	};
	frames
		.into_iter()
		.filter_map(|frame| {
			let Value::Object(map) = frame else {
				return None;
			};
			if !map.contains_key("method") {
				return None;
			}
			map.get("id").and_then(request_id_from_value)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_response_with_numeric_id() {
		let frame = r#"{"jsonrpc":"2.0","id":1,"result":"pong"}"#;
		assert_eq!(classify(frame), FrameClass::Response(RequestId::Num(1)));
	}

	#[test]
	fn classifies_response_with_string_id() {
		let frame = r#"{"jsonrpc":"2.0","id":"abc","result":null}"#;
		assert_eq!(
			classify(frame),
			FrameClass::Response(RequestId::Str("abc".to_string()))
		);
	}

	#[test]
	fn classifies_request_even_with_id_present() {
		let frame = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
		assert_eq!(classify(frame), FrameClass::RequestOrNotification);
	}

	#[test]
	fn classifies_notification_without_id() {
		let frame = r#"{"jsonrpc":"2.0","method":"progress","params":{"pct":50}}"#;
		assert_eq!(classify(frame), FrameClass::RequestOrNotification);
	}

	#[test]
	fn classifies_malformed_text_as_passthrough() {
		assert_eq!(classify("not json at all"), FrameClass::Passthrough);
	}

	#[test]
	fn classifies_object_with_neither_id_nor_method_as_passthrough() {
		assert_eq!(classify(r#"{"foo":"bar"}"#), FrameClass::Passthrough);
	}

	#[test]
	fn request_ids_in_body_handles_batches() {
		let body = r#"[
			{"jsonrpc":"2.0","id":1,"method":"ping"},
			{"jsonrpc":"2.0","method":"notify-only"},
			{"jsonrpc":"2.0","id":"x","method":"other"}
		]"#;
		let ids = request_ids_in_body(body);
		assert_eq!(ids, vec![RequestId::Num(1), RequestId::Str("x".to_string())]);
	}

	#[test]
	fn request_ids_in_body_handles_single_frame() {
		let body = r#"{"jsonrpc":"2.0","id":2,"method":"foo"}"#;
		assert_eq!(request_ids_in_body(body), vec![RequestId::Num(2)]);
	}
}
