// self
use crate::obs::{OpOutcome, ProxyOp};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: ProxyOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"fatsecret_proxy_op_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_op_outcome_without_recorder() {
		record_op_outcome(ProxyOp::SearchFood, OpOutcome::Failure);
		record_op_outcome(ProxyOp::AccessToken, OpOutcome::CacheHit);
	}
}
