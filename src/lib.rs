//! Thin HTTP proxy in front of the FatSecret food API.
//!
//! Callers hit `/searchFood`, `/getFood`, or `/findBarcode` without credentials; the proxy
//! obtains (and caches) an OAuth client-credentials token, forwards the query to the FatSecret
//! `server.api` endpoint, and relays the upstream JSON untouched.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod barcode;
pub mod broker;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod platform;
pub mod proxy;
pub mod server;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Clock, ManualClock},
		config::Config,
		http::ReqwestHttpClient,
		proxy::FoodProxy,
	};

	/// Client id used by test fixtures.
	pub const TEST_CLIENT_ID: &str = "test-client";
	/// Client secret used by test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "test-secret";

	/// Builds the production HTTP client with a short timeout suited to the local mock server.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(5))
			.expect("Test HTTP client should build.")
	}

	/// Builds a configuration pointing both upstream endpoints at `base_url`.
	pub fn test_config(base_url: &str) -> Config {
		Config::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
			.with_token_url(
				Url::parse(&format!("{base_url}/connect/token"))
					.expect("Mock token endpoint should parse successfully."),
			)
			.with_api_url(
				Url::parse(&format!("{base_url}/rest/server.api"))
					.expect("Mock API endpoint should parse successfully."),
			)
	}

	/// Constructs a [`FoodProxy`] wired to the mock server at `base_url`, driven by a
	/// [`ManualClock`] the test can advance.
	pub fn build_test_proxy(base_url: &str) -> (FoodProxy, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(OffsetDateTime::now_utc()));
		let shared: Arc<dyn Clock> = clock.clone();
		let proxy =
			FoodProxy::with_http_client(&test_config(base_url), test_reqwest_http_client(), shared)
				.expect("Test proxy should build against the mock server.");

		(proxy, clock)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// The binary reports startup failures through color-eyre.
use color_eyre as _;
#[cfg(test)] use {httpmock as _, tower as _};
