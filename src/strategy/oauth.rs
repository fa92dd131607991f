//! Three-legged OAuth 1.0a strategy.
//!
//! The flow walks `Unauthorized → RequestTokenObtained → Authorized`:
//! [`OAuthStrategy::authorization_url`] fetches a request token and returns the
//! URL to send the user to; [`OAuthStrategy::authorize`] (or
//! [`OAuthStrategy::authorize_with_verifier`] for providers that hand back a
//! verifier) exchanges it for an access token; afterwards
//! [`OAuthStrategy::sign_request`] produces realm-scoped `Authorization` header
//! values for every outgoing request. The terminal state is re-enterable by
//! running the flow again.

// self
use crate::{
	_prelude::*,
	error::{CredentialError, ExchangeError},
	http::FormHttpClient,
	obs::{ExchangeOutcome, ExchangePhase, ExchangeSpan, record_exchange_outcome},
	service::OAuthOptions,
	sign::{self, SigningCredentials},
};

/// Token key/secret pair returned by a token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
	/// Token identifier (`oauth_token`).
	pub key: String,
	/// Token secret (`oauth_token_secret`).
	pub secret: String,
}

/// Stateful three-legged OAuth strategy scoped to one service realm.
///
/// One logical flow per instance; the mutating operations take `&mut self`, so
/// overlapping exchanges on the same instance cannot be expressed.
pub struct OAuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	realm: String,
	options: Arc<OAuthOptions>,
	http_client: Arc<C>,
	request_token: Option<TokenPair>,
	access_token: Option<TokenPair>,
	signing: Option<SigningCredentials>,
	username: Option<String>,
}
impl<C> OAuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	/// Creates an unauthorized strategy for the provided realm and options.
	pub fn new(realm: impl Into<String>, options: Arc<OAuthOptions>, http_client: Arc<C>) -> Self {
		Self {
			realm: realm.into(),
			options,
			http_client,
			request_token: None,
			access_token: None,
			signing: None,
			username: None,
		}
	}

	/// Returns the realm (service identifier) scoping this strategy.
	pub fn realm(&self) -> &str {
		&self.realm
	}

	/// Returns the shared OAuth options.
	pub fn options(&self) -> &OAuthOptions {
		&self.options
	}

	/// Returns the username, which only ever arrives via [`load`](Self::load) or
	/// [`set_username`](Self::set_username) — the live flow never learns one.
	pub fn username(&self) -> Option<&str> {
		self.username.as_deref()
	}

	/// Sets the username emitted by [`save`](Self::save).
	pub fn set_username(&mut self, username: impl Into<String>) {
		self.username = Some(username.into());
	}

	/// Returns the pending request token, present only between the request-token
	/// fetch and the access-token exchange.
	pub fn request_token(&self) -> Option<&TokenPair> {
		self.request_token.as_ref()
	}

	/// Returns the installed access token, if the flow has completed.
	pub fn access_token(&self) -> Option<&TokenPair> {
		self.access_token.as_ref()
	}

	/// Fetches a request token and builds the URL to redirect the user to.
	///
	/// On success the pending request token is stored for the later access-token
	/// exchange. On failure the strategy stays unauthorized.
	pub async fn authorization_url(&mut self) -> Result<Url> {
		let pair = self.fetch_token(ExchangePhase::RequestToken, None).await?;
		let mut url = self.options.authorization_url.clone();

		url.query_pairs_mut().append_pair("oauth_token", &pair.key);
		self.request_token = Some(pair);

		Ok(url)
	}

	/// Exchanges the pending request token for an access token.
	pub async fn authorize(&mut self) -> Result<()> {
		self.exchange_access_token(None).await
	}

	/// Exchanges the pending request token for an access token, sending the
	/// `oauth_verifier` the provider (or user) supplied.
	pub async fn authorize_with_verifier(&mut self, verifier: &str) -> Result<()> {
		self.exchange_access_token(Some(verifier)).await
	}

	/// Records the access token pair and derives the signing credentials used by
	/// every subsequent [`sign_request`](Self::sign_request). Pure state mutation.
	pub fn set_access_token(&mut self, key: impl Into<String>, secret: impl Into<String>) {
		let key = key.into();
		let secret = secret.into();

		self.signing = Some(
			SigningCredentials::consumer(&self.options.consumer_key, &self.options.consumer_secret)
				.with_token(&key, &secret),
		);
		self.access_token = Some(TokenPair { key, secret });
		// The request token is only meaningful between the two fetches.
		self.request_token = None;
	}

	/// Signs a request and returns the realm-scoped `Authorization` header value.
	///
	/// Signing works on a copy of `parameters`; the caller's map is never touched.
	pub fn sign_request(
		&self,
		method: &str,
		url: &Url,
		parameters: &BTreeMap<String, String>,
	) -> Result<String> {
		let Some(credentials) = &self.signing else {
			return Err(Error::NotAuthorized);
		};
		let signed = sign::sign(method, url, parameters, credentials);

		Ok(sign::authorization_header(&self.realm, &signed))
	}

	/// Serializes to `"<username>:<accessTokenKey>:<accessTokenSecret>"`.
	///
	/// The username field is empty unless [`load`](Self::load) or
	/// [`set_username`](Self::set_username) populated it. Colons inside fields
	/// make the pickle ambiguous on reload; the format is kept verbatim.
	pub fn save(&self) -> Result<String> {
		let Some(token) = &self.access_token else {
			return Err(Error::NotAuthorized);
		};

		Ok(format!("{}:{}:{}", self.username.as_deref().unwrap_or_default(), token.key, token.secret))
	}

	/// Loads a pickle produced by [`save`](Self::save).
	///
	/// The pickle must split into exactly three colon-delimited fields; anything
	/// else fails without touching the current state.
	pub fn load(&mut self, pickle: &str) -> Result<()> {
		let parts: Vec<&str> = pickle.split(':').collect();

		if parts.len() != 3 {
			#[cfg(feature = "tracing")]
			tracing::warn!(found = parts.len(), "Rejected malformed oauth credential pickle.");

			return Err(
				CredentialError::InvalidFormat { kind: "oauth", expected: 3, found: parts.len() }
					.into(),
			);
		}

		self.username = Some(parts[0].to_owned());
		self.set_access_token(parts[1], parts[2]);

		Ok(())
	}

	async fn exchange_access_token(&mut self, verifier: Option<&str>) -> Result<()> {
		let pair = self.fetch_token(ExchangePhase::AccessToken, verifier).await?;

		self.set_access_token(pair.key, pair.secret);

		Ok(())
	}

	/// Issues a signed, cookie-suppressed form POST against the phase's endpoint
	/// and extracts the returned token pair.
	async fn fetch_token(&self, phase: ExchangePhase, verifier: Option<&str>) -> Result<TokenPair> {
		let span = ExchangeSpan::new(phase, "fetch_token");
		let url = match phase {
			ExchangePhase::RequestToken => &self.options.request_url,
			ExchangePhase::AccessToken => &self.options.access_url,
		};
		let mut credentials =
			SigningCredentials::consumer(&self.options.consumer_key, &self.options.consumer_secret);

		// The access-token phase signs with the pending request token; full signing
		// credentials do not exist yet at either phase.
		if matches!(phase, ExchangePhase::AccessToken) {
			if let Some(pending) = &self.request_token {
				credentials = credentials.with_token(&pending.key, &pending.secret);
			}
		}

		let mut parameters = BTreeMap::new();

		if let Some(verifier) = verifier {
			parameters.insert("oauth_verifier".to_owned(), verifier.to_owned());
		}

		let form: Vec<(String, String)> =
			sign::sign("POST", url, &parameters, &credentials).into_iter().collect();

		record_exchange_outcome(phase, ExchangeOutcome::Attempt);

		let body = span.instrument(self.http_client.post_form(url, &form)).await.map_err(|err| {
			record_exchange_outcome(phase, ExchangeOutcome::Failure);

			Error::from(err)
		})?;
		let pairs = sign::decode_form(&body);
		let token = sign::form_value(&pairs, "oauth_token");
		let secret = sign::form_value(&pairs, "oauth_token_secret");

		match (token, secret) {
			(Some(token), Some(secret)) => {
				record_exchange_outcome(phase, ExchangeOutcome::Success);

				Ok(TokenPair { key: token.to_owned(), secret: secret.to_owned() })
			},
			(None, _) => {
				record_exchange_outcome(phase, ExchangeOutcome::Failure);

				Err(ExchangeError::MissingParameter { name: "oauth_token" }.into())
			},
			(_, None) => {
				record_exchange_outcome(phase, ExchangeOutcome::Failure);

				Err(ExchangeError::MissingParameter { name: "oauth_token_secret" }.into())
			},
		}
	}
}
impl<C> Clone for OAuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			realm: self.realm.clone(),
			options: self.options.clone(),
			http_client: self.http_client.clone(),
			request_token: self.request_token.clone(),
			access_token: self.access_token.clone(),
			signing: self.signing.clone(),
			username: self.username.clone(),
		}
	}
}
impl<C> Debug for OAuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthStrategy")
			.field("realm", &self.realm)
			.field("username", &self.username)
			.field("request_token_set", &self.request_token.is_some())
			.field("access_token_set", &self.access_token.is_some())
			.finish()
	}
}
