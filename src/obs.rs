//! Optional observability helpers for token exchanges.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `auth_broker.exchange` with the
//!   `phase` (request/access token) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `auth_broker_exchange_total` counter for every
//!   attempt/success/failure, labeled by `phase` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Token exchange phases observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangePhase {
	/// Request-token fetch that bootstraps the authorization URL.
	RequestToken,
	/// Access-token fetch that completes the three-legged flow.
	AccessToken,
}
impl ExchangePhase {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangePhase::RequestToken => "request_token",
			ExchangePhase::AccessToken => "access_token",
		}
	}
}
impl Display for ExchangePhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each exchange attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// Entry to an exchange helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
