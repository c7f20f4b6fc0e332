//! Observability helpers for proxy operations.
//!
//! - Every operation runs inside a `fatsecret_proxy.op` span carrying `op` and `stage` fields.
//! - Enable the `metrics` feature to increment the `fatsecret_proxy_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProxyOp {
	/// Client-credentials token acquisition.
	AccessToken,
	/// `foods.search` relay.
	SearchFood,
	/// `food.get` relay.
	GetFood,
	/// `food.find_id_for_barcode` relay.
	FindBarcode,
}
impl ProxyOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProxyOp::AccessToken => "access_token",
			ProxyOp::SearchFood => "search_food",
			ProxyOp::GetFood => "get_food",
			ProxyOp::FindBarcode => "find_barcode",
		}
	}
}
impl Display for ProxyOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Cached token served without contacting the token endpoint.
	CacheHit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::CacheHit => "cache_hit",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
