//! Broker-level error types shared across strategies, signing, and transport.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Serialized credential could not be loaded.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Token endpoint answered but the response was not a usable token.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// Transport failure (DNS, TCP, TLS, non-2xx endpoint answer).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Factory asked to create a strategy for an unregistered service id.
	#[error("No service named `{service}` is registered.")]
	UnknownService {
		/// Service identifier the caller asked for.
		service: String,
	},
	/// Signing or saving attempted before any credential exists.
	#[error("No credentials are available; authorize or load first.")]
	NotAuthorized,
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Service is registered as OAuth but carries no OAuth options.
	#[error("Service `{service}` is registered as OAuth but has no OAuth options.")]
	MissingOAuthOptions {
		/// Service identifier with the incomplete binding.
		service: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Failures loading a serialized credential pickle.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// The pickle did not split into the expected colon-delimited field count.
	#[error(
		"Invalid {kind} credential pickle: expected {expected} colon-delimited fields, found {found}."
	)]
	InvalidFormat {
		/// Credential kind label (`basic` or `oauth`).
		kind: &'static str,
		/// Field count the format requires.
		expected: usize,
		/// Field count actually present.
		found: usize,
	},
}

/// Failures decoding a token endpoint's 2xx response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ExchangeError {
	/// The decoded form body is missing a required OAuth parameter.
	#[error("Token endpoint response is missing `{name}`.")]
	MissingParameter {
		/// Name of the absent parameter.
		name: &'static str,
	},
}

/// Transport-level failures (network, IO, endpoint rejections).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Token endpoint answered with a non-2xx status; the raw body is preserved
	/// so callers see the provider's detail verbatim.
	#[error("Token endpoint answered HTTP {status}: {body}")]
	Endpoint {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Raw response body.
		body: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
