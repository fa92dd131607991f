// self
use crate::obs::{ExchangeOutcome, ExchangePhase};

/// Records an exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange_outcome(phase: ExchangePhase, outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_broker_exchange_total",
			"phase" => phase.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (phase, outcome);
	}
}
