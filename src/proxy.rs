//! Food lookups relayed to FatSecret on the caller's behalf.
//!
//! [`FoodProxy`] validates the caller's query parameters, obtains a bearer token from the
//! [`TokenBroker`], and forwards one `server.api` call through the [`PlatformClient`]. Input
//! problems are rejected before any outbound request is made.

// crates.io
use tracing::warn;
// self
use crate::{
	_prelude::*,
	auth::Clock,
	barcode::Gtin13,
	broker::TokenBroker,
	config::Config,
	http::ReqwestHttpClient,
	obs::{self, OpOutcome, OpSpan, ProxyOp},
	platform::{ApiRequest, MAX_SEARCH_RESULTS, PlatformClient},
};

/// Query string accepted by `/searchFood`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchQuery {
	/// Search text.
	pub q: Option<String>,
	/// Zero-based result page.
	pub page: Option<String>,
	/// Result cap, `1..=50`.
	pub max_results: Option<String>,
}
impl SearchQuery {
	/// Query for `text` with upstream paging defaults.
	pub fn text(text: impl Into<String>) -> Self {
		Self { q: Some(text.into()), ..Default::default() }
	}
}

/// Query string accepted by `/getFood`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FoodQuery {
	/// FatSecret food identifier.
	pub id: Option<String>,
}

/// Query string accepted by `/findBarcode`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BarcodeQuery {
	/// Scanned barcode digits.
	pub barcode: Option<String>,
}

/// Relays food lookups to FatSecret with a managed access token.
#[derive(Debug)]
pub struct FoodProxy {
	/// Token source shared by every lookup.
	pub broker: TokenBroker,
	/// Food API client.
	pub platform: PlatformClient,
}
impl FoodProxy {
	/// Assembles a proxy from `config`, building the production HTTP client.
	pub fn new(config: &Config) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(config.http_timeout)?;

		Self::from_parts(config, http_client, None)
	}

	/// Assembles a proxy that reuses `http_client` and reads time from `clock`.
	pub fn with_http_client(
		config: &Config,
		http_client: ReqwestHttpClient,
		clock: Arc<dyn Clock>,
	) -> Result<Self> {
		Self::from_parts(config, http_client, Some(clock))
	}

	fn from_parts(
		config: &Config,
		http_client: ReqwestHttpClient,
		clock: Option<Arc<dyn Clock>>,
	) -> Result<Self> {
		let platform = PlatformClient::new(http_client.0.clone(), config.api_url.clone());
		let broker = match clock {
			Some(clock) => TokenBroker::with_clock(config, http_client, clock)?,
			None => TokenBroker::new(config, http_client)?,
		};

		Ok(Self { broker, platform })
	}

	/// Runs `foods.search` for `query.q`.
	pub async fn search_food(&self, query: &SearchQuery) -> Result<JsonValue> {
		let text = require("q", query.q.as_deref())?;
		let mut request = ApiRequest::foods_search(text);

		if let Some(page) = optional("page", query.page.as_deref())? {
			request = request.page(page);
		}
		if let Some(max) = optional("max_results", query.max_results.as_deref())? {
			if !(1..=MAX_SEARCH_RESULTS).contains(&max) {
				return Err(Error::invalid(
					"max_results",
					format!("must be between 1 and {MAX_SEARCH_RESULTS}"),
				));
			}

			request = request.max_results(max);
		}

		self.relay(ProxyOp::SearchFood, request).await
	}

	/// Runs `food.get` for `query.id`.
	pub async fn get_food(&self, query: &FoodQuery) -> Result<JsonValue> {
		let id = require("id", query.id.as_deref())?;

		self.relay(ProxyOp::GetFood, ApiRequest::food_get(id)).await
	}

	/// Runs `food.find_id_for_barcode` for `query.barcode`, normalized to GTIN-13.
	pub async fn find_barcode(&self, query: &BarcodeQuery) -> Result<JsonValue> {
		let raw = require("barcode", query.barcode.as_deref())?;
		let gtin = Gtin13::normalize(raw).map_err(|e| Error::invalid("barcode", e))?;

		self.relay(ProxyOp::FindBarcode, ApiRequest::find_id_for_barcode(&gtin)).await
	}

	async fn relay(&self, op: ProxyOp, request: ApiRequest) -> Result<JsonValue> {
		let span = OpSpan::new(op, request.method.as_str());

		obs::record_op_outcome(op, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let token = self.broker.access_token().await?;

				self.platform.call(&token, &request).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(op, OpOutcome::Success),
			Err(err) => {
				warn!(op = %op, error = %err, "Food lookup failed.");
				obs::record_op_outcome(op, OpOutcome::Failure);
			},
		}

		result
	}
}

fn require<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str> {
	value.filter(|value| !value.is_empty()).ok_or_else(|| Error::missing(name))
}

fn optional<T>(name: &'static str, value: Option<&str>) -> Result<Option<T>>
where
	T: FromStr,
	T::Err: Display,
{
	match value.map(str::trim).filter(|value| !value.is_empty()) {
		Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| Error::invalid(name, e)),
		None => Ok(None),
	}
}
