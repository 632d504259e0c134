use std::collections::{BTreeMap, HashMap};

use argon2::{
	Argon2,
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const MAX_PASSWORD_CHARS: usize = 128;

/// Password hashes plus live session tokens, persisted together as one
/// snapshot. Tokens slide: every successful resolution refreshes the
/// expiry window.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountStore {
	#[serde(default)]
	hashes: BTreeMap<String, String>,
	#[serde(default)]
	tokens: HashMap<String, TokenSession>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSession {
	pub name: String,
	/// Milliseconds since the Unix epoch of the last use.
	pub last: i64,
}

/// What a presented token turned out to be.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
	User(String),
	Expired,
	Unknown,
}

impl AccountStore {
	pub fn is_registered(&self, name: &str) -> bool {
		self.hashes.contains_key(name)
	}

	pub fn register(&mut self, name: &str, pass: &str) -> Result<()> {
		if self.is_registered(name) {
			return Err(Error::AlreadyRegistered);
		}

		let salt = SaltString::generate(&mut OsRng);
		let hash =
			Argon2::default().hash_password(pass.as_bytes(), &salt).map_err(Error::Hash)?;

		self.hashes.insert(name.to_string(), hash.to_string());
		tracing::info!(user = name, "registered account.");

		Ok(())
	}

	/// Verify the password and issue a fresh session token.
	pub fn login(&mut self, name: &str, pass: &str, now_ms: i64) -> Result<String> {
		let Some(stored) = self.hashes.get(name) else {
			return Err(Error::NotRegistered);
		};
		let parsed = PasswordHash::new(stored).map_err(Error::Hash)?;

		if Argon2::default().verify_password(pass.as_bytes(), &parsed).is_err() {
			return Err(Error::BadPassword);
		}

		let token = Uuid::new_v4().to_string();

		self.tokens
			.insert(token.clone(), TokenSession { name: name.to_string(), last: now_ms });

		Ok(token)
	}

	/// Look a token up, expiring it when its sliding window has lapsed
	/// and refreshing the window otherwise.
	pub fn resolve(&mut self, token: &str, expiry_ms: i64, now_ms: i64) -> Resolution {
		let Some(session) = self.tokens.get_mut(token) else {
			return Resolution::Unknown;
		};

		if now_ms > session.last + expiry_ms {
			self.tokens.remove(token);

			return Resolution::Expired;
		}

		session.last = now_ms;

		Resolution::User(session.name.clone())
	}

	pub fn logout(&mut self, token: &str) {
		self.tokens.remove(token);
	}

	/// Drop every lapsed token. Returns how many were dropped.
	pub fn prune(&mut self, expiry_ms: i64, now_ms: i64) -> usize {
		let before = self.tokens.len();

		self.tokens.retain(|_, session| now_ms <= session.last + expiry_ms);

		before - self.tokens.len()
	}
}
