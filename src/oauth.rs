//! OAuth 2.0 authorization-code flow, Dynamic Client Registration (RFC
//! 7591), and authorization-server metadata discovery (RFC 8414), scoped
//! down to the one thing this bridge needs them for: minting a bearer
//! token that resolves to a session key (§4.7).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::session::SessionKey;

const AUTH_CODE_TTL: Duration = Duration::from_secs(60);
const TOKEN_TTL: Duration = Duration::from_secs(3600);

fn random_token(prefix: &str) -> String {
	format!("{prefix}_{:032x}", rand::random::<u128>())
}

#[derive(Clone, Debug)]
pub struct ClientRegistration {
	pub client_id: String,
	pub client_secret: String,
	pub redirect_uris: Vec<String>,
}

struct PendingGrant {
	client_id: String,
	redirect_uri: String,
	session_key: SessionKey,
	expires_at: Instant,
}

struct IssuedToken {
	session_key: SessionKey,
	#[allow(dead_code)]
	expires_at: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
	#[error("unknown client_id")]
	UnknownClient,
	#[error("redirect_uri does not match registration")]
	RedirectMismatch,
	#[error("authorization code is invalid or expired")]
	InvalidGrant,
}

/// In-memory store backing the authorization-code flow. A restart forgets
/// every registration and token; this bridge treats OAuth state as
/// session-lifetime, not as durable identity (§4.7, Non-goals).
#[derive(Default)]
pub struct OAuthStore {
	clients: Mutex<HashMap<String, ClientRegistration>>,
	pending: Mutex<HashMap<String, PendingGrant>>,
	tokens: Mutex<HashMap<String, IssuedToken>>,
}

impl OAuthStore {
	pub fn register_client(&self, redirect_uris: Vec<String>) -> ClientRegistration {
		let registration = ClientRegistration {
			client_id: random_token("client"),
			client_secret: random_token("secret"),
			redirect_uris,
		};
		self.clients
			.lock()
			.unwrap()
			.insert(registration.client_id.clone(), registration.clone());
		registration
	}

	pub fn client(&self, client_id: &str) -> Option<ClientRegistration> {
		self.clients.lock().unwrap().get(client_id).cloned()
	}

	/// Mints an authorization code once the resource owner (the person
	/// looking at the consent page) has approved access to `session_key`.
	pub fn mint_auth_code(
		&self,
		client_id: &str,
		redirect_uri: &str,
		session_key: SessionKey,
	) -> Result<String, OAuthError> {
		let client = self.client(client_id).ok_or(OAuthError::UnknownClient)?;
		if !client.redirect_uris.iter().any(|uri| uri == redirect_uri) {
			return Err(OAuthError::RedirectMismatch);
		}
		let code = random_token("code");
		self.pending.lock().unwrap().insert(
			code.clone(),
			PendingGrant {
				client_id: client_id.to_string(),
				redirect_uri: redirect_uri.to_string(),
				session_key,
				expires_at: Instant::now() + AUTH_CODE_TTL,
			},
		);
		Ok(code)
	}

	/// Exchanges a one-time authorization code for a bearer token.
	pub fn exchange_code(
		&self,
		client_id: &str,
		code: &str,
		redirect_uri: &str,
	) -> Result<String, OAuthError> {
		let grant = self
			.pending
			.lock()
			.unwrap()
			.remove(code)
			.ok_or(OAuthError::InvalidGrant)?;
		if grant.expires_at < Instant::now() {
			return Err(OAuthError::InvalidGrant);
		}
		if grant.client_id != client_id || grant.redirect_uri != redirect_uri {
			return Err(OAuthError::InvalidGrant);
		}
		let token = random_token("tok");
		self.tokens.lock().unwrap().insert(
			token.clone(),
			IssuedToken {
				session_key: grant.session_key,
				expires_at: Instant::now() + TOKEN_TTL,
			},
		);
		Ok(token)
	}

	/// Resolves a bearer token to the session key it grants access to, if
	/// the token is known and unexpired.
	pub fn resolve_token(&self, token: &str) -> Option<SessionKey> {
		let tokens = self.tokens.lock().unwrap();
		let issued = tokens.get(token)?;
		if issued.expires_at < Instant::now() {
			return None;
		}
		Some(issued.session_key.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_authorization_code_round_trip() {
		let store = OAuthStore::default();
		let client = store.register_client(vec!["https://app.example/cb".to_string()]);

		let code = store
			.mint_auth_code(&client.client_id, "https://app.example/cb", "sess-1".to_string())
			.unwrap();

		let token = store
			.exchange_code(&client.client_id, &code, "https://app.example/cb")
			.unwrap();

		assert_eq!(store.resolve_token(&token), Some("sess-1".to_string()));
	}

	#[test]
	fn code_cannot_be_redeemed_twice() {
		let store = OAuthStore::default();
		let client = store.register_client(vec!["https://app.example/cb".to_string()]);
		let code = store
			.mint_auth_code(&client.client_id, "https://app.example/cb", "sess-1".to_string())
			.unwrap();
		assert!(store.exchange_code(&client.client_id, &code, "https://app.example/cb").is_ok());
		assert!(store.exchange_code(&client.client_id, &code, "https://app.example/cb").is_err());
	}

	#[test]
	fn redirect_uri_must_match_registration() {
		let store = OAuthStore::default();
		let client = store.register_client(vec!["https://app.example/cb".to_string()]);
		let err = store
			.mint_auth_code(&client.client_id, "https://evil.example/cb", "sess-1".to_string())
			.unwrap_err();
		assert!(matches!(err, OAuthError::RedirectMismatch));
	}
}
