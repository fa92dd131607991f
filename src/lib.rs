//! Pluggable per-service authentication broker—Basic and three-legged OAuth 1.0a
//! strategies, request signing, and compact credential persistence in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod http;
pub mod obs;
pub mod service;
pub mod sign;
pub mod strategy;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{http::ReqwestHttpClient, service::ServiceRegistry, strategy::AuthFactory};

	/// Factory type alias used by reqwest-backed integration tests.
	pub type ReqwestTestFactory = AuthFactory<ReqwestHttpClient>;

	/// Constructs an [`AuthFactory`] backed by the default reqwest transport, returning the
	/// registry handle alongside so tests can mutate bindings mid-flight.
	pub fn build_reqwest_test_factory(
		registry: ServiceRegistry,
	) -> (ReqwestTestFactory, Arc<ServiceRegistry>) {
		let registry = Arc::new(registry);
		let factory = AuthFactory::new(registry.clone());

		(factory, registry)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
