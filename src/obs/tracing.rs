// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
use tracing_subscriber::{EnvFilter, fmt};
// self
use crate::{_prelude::*, obs::ProxyOp};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,fatsecret_proxy=debug";

/// Installs the global `fmt` subscriber, honoring `RUST_LOG` when present.
///
/// Calling it twice is harmless; the second installation attempt is ignored.
pub fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
	let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// A span builder used by proxy operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	span: Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: ProxyOp, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("fatsecret_proxy.op", op = op.as_str(), stage) }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
