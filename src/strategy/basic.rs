//! Static-credential (Basic) strategy.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
// self
use crate::{_prelude::*, error::CredentialError};

/// Username/password strategy with a precomputed signing value.
///
/// `authorize` is synchronous and always succeeds; the signing value is
/// recomputed whenever the pair changes and stays fixed between calls.
#[derive(Clone, Debug, Default)]
pub struct BasicAuth {
	username: String,
	password: String,
	header: Option<String>,
}
impl BasicAuth {
	/// Creates an empty, unauthorized strategy.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores the pair and derives `"Basic " + base64(username ":" password)`.
	pub fn authorize(&mut self, username: impl Into<String>, password: impl Into<String>) {
		self.username = username.into();
		self.password = password.into();
		self.header =
			Some(format!("Basic {}", BASE64.encode(format!("{}:{}", self.username, self.password))));
	}

	/// Returns the precomputed signing value for the `Authorization` header.
	pub fn sign_request(&self) -> Result<&str> {
		self.header.as_deref().ok_or(Error::NotAuthorized)
	}

	/// Serializes to `"<username>:<password>"`.
	///
	/// A colon inside either field makes the pickle ambiguous on reload; the
	/// format is kept verbatim for compatibility with existing stores.
	pub fn save(&self) -> Result<String> {
		if self.header.is_none() {
			return Err(Error::NotAuthorized);
		}

		Ok(format!("{}:{}", self.username, self.password))
	}

	/// Loads a pickle produced by [`save`](Self::save).
	///
	/// The pickle must split into exactly two colon-delimited fields; anything
	/// else fails without touching the current state.
	pub fn load(&mut self, pickle: &str) -> Result<()> {
		let parts: Vec<&str> = pickle.split(':').collect();

		if parts.len() != 2 {
			#[cfg(feature = "tracing")]
			tracing::warn!(found = parts.len(), "Rejected malformed basic credential pickle.");

			return Err(
				CredentialError::InvalidFormat { kind: "basic", expected: 2, found: parts.len() }
					.into(),
			);
		}

		self.authorize(parts[0], parts[1]);

		Ok(())
	}

	/// Returns the stored username.
	pub fn username(&self) -> &str {
		&self.username
	}

	/// Returns the stored password.
	pub fn password(&self) -> &str {
		&self.password
	}
}
