//! Client for the FatSecret `server.api` endpoint.
//!
//! Every call is a form-encoded POST carrying `method`, the method's own parameters, and
//! `format=json`, authenticated with the broker's bearer token. Successful bodies are returned
//! as opaque JSON; the proxy never reshapes them.

// crates.io
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::debug;
// self
use crate::{_prelude::*, auth::TokenSecret, barcode::Gtin13, http};

/// Maximum `max_results` FatSecret accepts for `foods.search`.
pub const MAX_SEARCH_RESULTS: u32 = 50;

/// `server.api` methods relayed by the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiMethod {
	/// Free-text food search.
	FoodsSearch,
	/// Food detail by identifier.
	FoodGet,
	/// Food identifier lookup by GTIN-13 barcode.
	FoodFindIdForBarcode,
}
impl ApiMethod {
	/// Returns the wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiMethod::FoodsSearch => "foods.search",
			ApiMethod::FoodGet => "food.get",
			ApiMethod::FoodFindIdForBarcode => "food.find_id_for_barcode",
		}
	}
}
impl Display for ApiMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One `server.api` call: a method plus its form parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// Method to invoke.
	pub method: ApiMethod,
	/// Method-specific parameters (excluding `method` and `format`).
	pub params: BTreeMap<&'static str, String>,
}
impl ApiRequest {
	/// Creates a request with no parameters.
	pub fn new(method: ApiMethod) -> Self {
		Self { method, params: BTreeMap::new() }
	}

	/// `foods.search` for `expression`.
	pub fn foods_search(expression: impl Into<String>) -> Self {
		Self::new(ApiMethod::FoodsSearch).param("search_expression", expression)
	}

	/// `food.get` for `food_id`.
	pub fn food_get(food_id: impl Into<String>) -> Self {
		Self::new(ApiMethod::FoodGet).param("food_id", food_id)
	}

	/// `food.find_id_for_barcode` for a normalized barcode.
	pub fn find_id_for_barcode(barcode: &Gtin13) -> Self {
		Self::new(ApiMethod::FoodFindIdForBarcode).param("barcode", barcode.as_str())
	}

	/// Adds (or replaces) a form parameter.
	pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
		self.params.insert(key, value.into());

		self
	}

	/// Sets the zero-based result page for searches.
	pub fn page(self, page: u32) -> Self {
		self.param("page_number", page.to_string())
	}

	/// Caps the number of search results.
	pub fn max_results(self, max: u32) -> Self {
		self.param("max_results", max.to_string())
	}

	/// Full form body, including `method` and `format=json`.
	pub fn form(&self) -> Vec<(&'static str, &str)> {
		let mut form = Vec::with_capacity(self.params.len() + 2);

		form.push(("method", self.method.as_str()));
		form.extend(self.params.iter().map(|(key, value)| (*key, value.as_str())));
		form.push(("format", "json"));

		form
	}
}

/// Bearer-authenticated client for the food API endpoint.
#[derive(Clone, Debug)]
pub struct PlatformClient {
	http_client: ReqwestClient,
	endpoint: Url,
}
impl PlatformClient {
	/// Creates a client posting to `endpoint`.
	pub fn new(http_client: ReqwestClient, endpoint: Url) -> Self {
		Self { http_client, endpoint }
	}

	/// Performs `request` with `token` and returns the upstream JSON verbatim.
	///
	/// Transport failures, non-2xx statuses, and bodies that are not JSON all map to
	/// [`Error::UpstreamRequest`].
	pub async fn call(&self, token: &TokenSecret, request: &ApiRequest) -> Result<JsonValue> {
		let response = self
			.http_client
			.post(self.endpoint.clone())
			.bearer_auth(token.expose())
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.form(&request.form())
			.send()
			.await
			.map_err(|e| transport_error(&e))?;
		let status = response.status();
		let body = response.bytes().await.map_err(|e| transport_error(&e))?;

		debug!(
			method = %request.method,
			status = status.as_u16(),
			bytes = body.len(),
			"Food API responded."
		);

		if !status.is_success() {
			return Err(Error::UpstreamRequest {
				status: Some(status.as_u16()),
				message: match http::body_preview(&body) {
					preview if preview.is_empty() =>
						status.canonical_reason().unwrap_or("no response body").to_owned(),
					preview => preview,
				},
			});
		}

		serde_json::from_slice(&body).map_err(|e| Error::UpstreamRequest {
			status: Some(status.as_u16()),
			message: format!("response is not valid JSON ({e})"),
		})
	}
}

fn transport_error(err: &ReqwestError) -> Error {
	let message =
		if err.is_timeout() { "request timed out".to_owned() } else { err.to_string() };

	Error::UpstreamRequest { status: err.status().map(|code| code.as_u16()), message }
}
