//! HTTP surface: routes, JSON error mapping, and the serve loop.

// std
use std::net::SocketAddr;
// crates.io
use axum::{
	Json, Router,
	extract::{RawQuery, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde::de::DeserializeOwned;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	config::Config,
	error::ConfigError,
	proxy::{BarcodeQuery, FoodProxy, FoodQuery, SearchQuery},
};

/// Shared handler state.
pub type AppState = Arc<FoodProxy>;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Human-readable failure description.
	pub error: String,
}

/// JSON body returned by `/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
	/// Always `"healthy"`.
	pub status: String,
	/// Current time in fractional seconds since the Unix epoch.
	pub timestamp: f64,
}

/// Builds the router with every proxy route mounted.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/searchFood", get(search_food))
		.route("/getFood", get(get_food))
		.route("/findBarcode", get(find_barcode))
		.route("/health", get(health))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
	let proxy = FoodProxy::new(&config)?;
	let address = SocketAddr::new(config.host, config.port);

	info!(config = ?config, "Starting fatsecret-proxy.");

	let listener = TcpListener::bind(address)
		.await
		.map_err(|source| ConfigError::Bind { address, source })?;

	info!("Server running on {address}");

	axum::serve(listener, router(Arc::new(proxy)))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(Error::internal)?;

	info!("Server shut down.");

	Ok(())
}

async fn search_food(
	State(proxy): State<AppState>,
	RawQuery(raw): RawQuery,
) -> Result<Json<JsonValue>> {
	let query = parse_query::<SearchQuery>(raw.as_deref())?;

	proxy.search_food(&query).await.map(Json)
}

async fn get_food(
	State(proxy): State<AppState>,
	RawQuery(raw): RawQuery,
) -> Result<Json<JsonValue>> {
	let query = parse_query::<FoodQuery>(raw.as_deref())?;

	proxy.get_food(&query).await.map(Json)
}

async fn find_barcode(
	State(proxy): State<AppState>,
	RawQuery(raw): RawQuery,
) -> Result<Json<JsonValue>> {
	let query = parse_query::<BarcodeQuery>(raw.as_deref())?;

	proxy.find_barcode(&query).await.map(Json)
}

/// Decodes a query string into `T`, keeping the first value of a repeated key.
pub fn parse_query<T>(raw: Option<&str>) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut params = serde_json::Map::new();

	for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
		params.entry(key.into_owned()).or_insert_with(|| JsonValue::String(value.into_owned()));
	}

	serde_json::from_value(JsonValue::Object(params)).map_err(|e| Error::invalid("query", e))
}

async fn health() -> Json<HealthStatus> {
	Json(HealthStatus { status: "healthy".into(), timestamp: unix_seconds(OffsetDateTime::now_utc()) })
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = status_for(&self);

		if status.is_server_error() {
			error!(error = %self, "Request failed.");
		}

		(status, Json(ErrorBody { error: wire_message(&self) })).into_response()
	}
}

fn status_for(err: &Error) -> StatusCode {
	if err.is_client_error() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR }
}

fn wire_message(err: &Error) -> String {
	if err.is_client_error() {
		err.to_string()
	} else if err.is_upstream_error() {
		format!("API request failed: {err}")
	} else {
		format!("Server error: {err}")
	}
}

fn unix_seconds(instant: OffsetDateTime) -> f64 {
	instant.unix_timestamp_nanos() as f64 / 1_000_000_000.
}

async fn shutdown_signal() {
	let ctrl_c = async {
		match signal::ctrl_c().await {
			Ok(()) => info!("Received Ctrl+C, shutting down"),
			Err(e) => {
				warn!("Failed to install Ctrl+C handler: {e}");
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				info!("Received terminate signal, shutting down");
			},
			Err(e) => {
				warn!("Failed to install SIGTERM handler: {e}");
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn status_and_message_follow_error_kind() {
		let cases = [
			(Error::missing("q"), StatusCode::BAD_REQUEST, "Missing ?q parameter"),
			(
				Error::invalid("barcode", "barcode must contain only digits"),
				StatusCode::BAD_REQUEST,
				"Invalid ?barcode parameter: barcode must contain only digits",
			),
			(
				Error::UpstreamAuth { status: Some(401), message: "invalid_client".into() },
				StatusCode::INTERNAL_SERVER_ERROR,
				"API request failed: token endpoint returned HTTP 401: invalid_client",
			),
			(
				Error::UpstreamRequest { status: Some(503), message: "down".into() },
				StatusCode::INTERNAL_SERVER_ERROR,
				"API request failed: food API returned HTTP 503: down",
			),
			(
				Error::internal("boom"),
				StatusCode::INTERNAL_SERVER_ERROR,
				"Server error: boom",
			),
		];

		for (err, status, message) in cases {
			assert_eq!(status_for(&err), status);
			assert_eq!(wire_message(&err), message);
		}
	}

	#[test]
	fn parse_query_keeps_first_repeated_value() {
		let query = parse_query::<FoodQuery>(Some("id=12345&id=999&extra=1"))
			.expect("Repeated keys should parse.");

		assert_eq!(query.id.as_deref(), Some("12345"));

		let query = parse_query::<SearchQuery>(Some("q=green+apple&page=%32"))
			.expect("Encoded values should parse.");

		assert_eq!(query.q.as_deref(), Some("green apple"));
		assert_eq!(query.page.as_deref(), Some("2"));

		let query = parse_query::<BarcodeQuery>(None).expect("Empty query should parse.");

		assert!(query.barcode.is_none());
	}

	#[tokio::test]
	async fn internal_errors_render_server_error_json() {
		let response = Error::internal("listener closed").into_response();

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.expect("Response body should be readable.");
		let body = serde_json::from_slice::<ErrorBody>(&bytes).expect("Body should be JSON.");

		assert_eq!(body.error, "Server error: listener closed");
	}

	#[test]
	fn unix_seconds_keeps_fraction() {
		let instant = macros::datetime!(2025-01-01 00:00:00.5 UTC);

		assert_eq!(unix_seconds(instant), 1_735_689_600.5);
	}
}
