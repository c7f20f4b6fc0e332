//! Cached client-credentials token acquisition.

// crates.io
use tracing::{debug, warn};
// self
use crate::{
	_prelude::*,
	auth::{TokenRecord, TokenSecret},
	broker::TokenBroker,
	obs::{self, OpOutcome, OpSpan, ProxyOp},
};

impl TokenBroker {
	/// Returns a bearer token that is valid right now.
	///
	/// Serves the cached token while `now < expires_at`; otherwise performs the
	/// client-credentials grant, stores the new record, and returns its token. Token endpoint
	/// failures surface as [`Error::UpstreamAuth`] and leave the cache untouched.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		self.token_record().await.map(|record| record.access_token)
	}

	/// Same as [`TokenBroker::access_token`] but returns the whole cached record.
	pub async fn token_record(&self) -> Result<TokenRecord> {
		const OP: ProxyOp = ProxyOp::AccessToken;

		let now = self.clock.now();

		if let Some(current) = self.cache.current(now) {
			obs::record_op_outcome(OP, OpOutcome::CacheHit);

			return Ok(current);
		}

		let span = OpSpan::new(OP, "client_credentials");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let record = self.facade.exchange_client_credentials(now).await?;

				debug!(
					expires_at = %record.expires_at,
					remaining_secs = record.remaining_at(now).whole_seconds(),
					"Fetched a new access token."
				);
				self.cache.replace(record.clone());

				Ok(record)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(err) => {
				warn!(error = %err, "Token request failed.");
				obs::record_op_outcome(OP, OpOutcome::Failure);
			},
		}

		result
	}

	/// Drops the cached token so the next call fetches a fresh one.
	pub fn invalidate(&self) {
		self.cache.clear();
	}
}
