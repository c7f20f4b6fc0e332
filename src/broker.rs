//! Token broker: owns the cached FatSecret access token and knows how to replace it.

mod client_credentials;

// self
use crate::{
	_prelude::*,
	auth::{Clock, SystemClock, TokenCache},
	config::Config,
	http::ReqwestHttpClient,
	oauth::TokenFacade,
};

/// Hands out bearer tokens for the food API, fetching a new one only when the cached token
/// is missing or past its adjusted expiry.
///
/// Concurrent callers are not coalesced: two requests racing on an empty cache each fetch a
/// token and the later write wins.
pub struct TokenBroker {
	/// OAuth facade used for every token request.
	pub facade: TokenFacade,
	/// Single-slot cache holding the current token.
	pub cache: TokenCache,
	/// Time source used for expiry decisions.
	pub clock: Arc<dyn Clock>,
}
impl TokenBroker {
	/// Creates a broker for the configured token endpoint using the system clock.
	pub fn new(config: &Config, http_client: ReqwestHttpClient) -> Result<Self> {
		Self::with_clock(config, http_client, Arc::new(SystemClock))
	}

	/// Creates a broker driven by a caller-supplied clock.
	pub fn with_clock(
		config: &Config,
		http_client: ReqwestHttpClient,
		clock: Arc<dyn Clock>,
	) -> Result<Self> {
		let facade = TokenFacade::new(
			&config.token_url,
			&config.client_id,
			&config.client_secret,
			config.scope.clone(),
			http_client,
		)?;

		Ok(Self { facade, cache: TokenCache::default(), clock })
	}
}
impl Debug for TokenBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("facade", &self.facade)
			.field("cached", &self.cache.peek())
			.finish()
	}
}
