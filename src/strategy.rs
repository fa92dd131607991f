//! Strategy construction and the per-service capability surface.

pub mod basic;
pub mod oauth;

pub use basic::BasicAuth;
pub use oauth::{OAuthStrategy, TokenPair};

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::FormHttpClient,
	service::{AuthKind, ServiceBinding, ServiceRegistry},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Factory specialized for the crate's default reqwest transport.
pub type ReqwestAuthFactory = AuthFactory<ReqwestHttpClient>;

/// Builds authentication strategies from a service registry.
///
/// The factory owns the registry handle and the HTTP transport so strategy
/// construction stays a pure lookup-and-dispatch step; OAuth strategies receive
/// a clone of the shared transport, Basic strategies need nothing.
pub struct AuthFactory<C>
where
	C: ?Sized + FormHttpClient,
{
	registry: Arc<ServiceRegistry>,
	http_client: Arc<C>,
}
impl<C> AuthFactory<C>
where
	C: ?Sized + FormHttpClient,
{
	/// Creates a factory that reuses the caller-provided transport.
	pub fn with_http_client(registry: Arc<ServiceRegistry>, http_client: impl Into<Arc<C>>) -> Self {
		Self { registry, http_client: http_client.into() }
	}

	/// Returns the registry this factory resolves bindings from.
	pub fn registry(&self) -> &Arc<ServiceRegistry> {
		&self.registry
	}

	/// Inserts or overwrites a service binding; convenience for
	/// [`ServiceRegistry::register`].
	pub fn register_service(&self, service: impl Into<String>, binding: ServiceBinding) {
		self.registry.register(service, binding);
	}

	/// Builds a strategy for the named service.
	///
	/// Unknown ids fail with [`Error::UnknownService`]. An OAuth binding gets an
	/// OAuth strategy scoped to the service id as realm; every other kind falls
	/// back to a Basic strategy, the historical policy for unrecognized kinds.
	pub fn create(&self, service: &str) -> Result<AuthStrategy<C>> {
		let Some(binding) = self.registry.binding(service) else {
			#[cfg(feature = "tracing")]
			tracing::warn!(service, "Rejected strategy request for an unregistered service.");

			return Err(Error::UnknownService { service: service.to_owned() });
		};

		match binding.kind {
			AuthKind::OAuth => {
				let options = binding
					.oauth
					.ok_or_else(|| ConfigError::MissingOAuthOptions { service: service.to_owned() })?;

				Ok(AuthStrategy::OAuth(OAuthStrategy::new(
					service,
					options,
					self.http_client.clone(),
				)))
			},
			_ => Ok(AuthStrategy::Basic(BasicAuth::new())),
		}
	}
}
#[cfg(feature = "reqwest")]
impl AuthFactory<ReqwestHttpClient> {
	/// Creates a factory backed by the default reqwest transport.
	pub fn new(registry: Arc<ServiceRegistry>) -> Self {
		Self::with_http_client(registry, ReqwestHttpClient::default())
	}
}
impl<C> Clone for AuthFactory<C>
where
	C: ?Sized + FormHttpClient,
{
	fn clone(&self) -> Self {
		Self { registry: self.registry.clone(), http_client: self.http_client.clone() }
	}
}
impl<C> Debug for AuthFactory<C>
where
	C: ?Sized + FormHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthFactory").field("services", &self.registry.services()).finish()
	}
}

/// Strategy for one (service, account) pair.
///
/// Both variants fulfill the same capability contract — produce a signing value
/// for a request and serialize/deserialize to a compact pickle. The Basic
/// variant ignores the request-specific arguments of
/// [`sign_request`](Self::sign_request); its signing value is static.
pub enum AuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	/// Static username/password credentials.
	Basic(BasicAuth),
	/// Three-legged OAuth 1.0a delegated authorization.
	OAuth(OAuthStrategy<C>),
}
impl<C> AuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	/// Returns the authentication kind backing this strategy.
	pub fn kind(&self) -> AuthKind {
		match self {
			Self::Basic(_) => AuthKind::Basic,
			Self::OAuth(_) => AuthKind::OAuth,
		}
	}

	/// Produces the `Authorization` header value for a request.
	///
	/// OAuth signs `method` + `url` + a copy of `parameters`; Basic returns its
	/// precomputed value and ignores the arguments.
	pub fn sign_request(
		&self,
		method: &str,
		url: &Url,
		parameters: &BTreeMap<String, String>,
	) -> Result<String> {
		match self {
			Self::Basic(auth) => auth.sign_request().map(ToOwned::to_owned),
			Self::OAuth(auth) => auth.sign_request(method, url, parameters),
		}
	}

	/// Serializes the credential to its compact pickle form.
	pub fn save(&self) -> Result<String> {
		match self {
			Self::Basic(auth) => auth.save(),
			Self::OAuth(auth) => auth.save(),
		}
	}

	/// Restores the credential from a pickle produced by [`save`](Self::save).
	pub fn load(&mut self, pickle: &str) -> Result<()> {
		match self {
			Self::Basic(auth) => auth.load(pickle),
			Self::OAuth(auth) => auth.load(pickle),
		}
	}

	/// Returns the username, when one is known.
	pub fn username(&self) -> Option<&str> {
		match self {
			Self::Basic(auth) => Some(auth.username()),
			Self::OAuth(auth) => auth.username(),
		}
	}

	/// Borrows the Basic variant, if this is one.
	pub fn as_basic(&self) -> Option<&BasicAuth> {
		match self {
			Self::Basic(auth) => Some(auth),
			Self::OAuth(_) => None,
		}
	}

	/// Mutably borrows the Basic variant, if this is one.
	pub fn as_basic_mut(&mut self) -> Option<&mut BasicAuth> {
		match self {
			Self::Basic(auth) => Some(auth),
			Self::OAuth(_) => None,
		}
	}

	/// Borrows the OAuth variant, if this is one.
	pub fn as_oauth(&self) -> Option<&OAuthStrategy<C>> {
		match self {
			Self::Basic(_) => None,
			Self::OAuth(auth) => Some(auth),
		}
	}

	/// Mutably borrows the OAuth variant, if this is one.
	pub fn as_oauth_mut(&mut self) -> Option<&mut OAuthStrategy<C>> {
		match self {
			Self::Basic(_) => None,
			Self::OAuth(auth) => Some(auth),
		}
	}
}
impl<C> Clone for AuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	fn clone(&self) -> Self {
		match self {
			Self::Basic(auth) => Self::Basic(auth.clone()),
			Self::OAuth(auth) => Self::OAuth(auth.clone()),
		}
	}
}
impl<C> Debug for AuthStrategy<C>
where
	C: ?Sized + FormHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Basic(auth) => f.debug_tuple("Basic").field(auth).finish(),
			Self::OAuth(auth) => f.debug_tuple("OAuth").field(auth).finish(),
		}
	}
}
