// self
use crate::obs::{CacheEvent, OperationKind, Outcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(kind: OperationKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"tink_finance_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a token cache event via the global metrics recorder and a debug event (when enabled).
pub fn record_cache_event(event: CacheEvent) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("tink_finance_token_cache_total", "event" => event.as_str()).increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(event = event.as_str(), "token cache");
	}

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = event;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_callable_without_a_global_recorder() {
		record_outcome(OperationKind::CreateUser, Outcome::Failure);
		record_cache_event(CacheEvent::Miss);
	}
}
