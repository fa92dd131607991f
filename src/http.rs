//! Transport primitives for OAuth token exchanges.
//!
//! The module exposes [`FormHttpClient`], the broker's only dependency on an HTTP
//! stack. Implementations submit a form-encoded POST with cookies suppressed and
//! resolve to exactly one outcome per call: the body text on 2xx, a
//! [`TransportError`] otherwise. No retries, timeouts, or cancellation are layered
//! on top; callers needing those wrap the transport themselves.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::COOKIE;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`FormHttpClient::post_form`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<String, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing token exchanges.
///
/// Implementations must be `Send + Sync` so one transport can back every strategy
/// a factory hands out. The returned future must own whatever state it needs so it
/// stays `Send` for the lifetime of the in-flight exchange.
pub trait FormHttpClient
where
	Self: Send + Sync,
{
	/// Submits `form` to `url` as a form-encoded POST.
	///
	/// # Transport Contract
	///
	/// - Cookies are suppressed on every request; exchanges must never leak session
	///   state across unrelated domains.
	/// - A 2xx response resolves to the raw body text.
	/// - A non-2xx response resolves to [`TransportError::Endpoint`] carrying the
	///   status and the raw body.
	/// - Network-level failures resolve to [`TransportError::Network`].
	fn post_form<'a>(&'a self, url: &'a Url, form: &'a [(String, String)]) -> TransportFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token exchanges should not follow redirects; configure any custom
/// [`ReqwestClient`] accordingly before passing it to [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl FormHttpClient for ReqwestHttpClient {
	fn post_form<'a>(&'a self, url: &'a Url, form: &'a [(String, String)]) -> TransportFuture<'a> {
		let client = self.0.clone();
		let url = url.clone();
		let form = form.to_vec();

		Box::pin(async move {
			// Blank Cookie header overrides anything an ambient cookie store would attach.
			let response = client.post(url).header(COOKIE, "").form(&form).send().await?;
			let status = response.status();
			let body = response.text().await?;

			if !status.is_success() {
				return Err(TransportError::Endpoint { status: status.as_u16(), body });
			}

			Ok(body)
		})
	}
}
