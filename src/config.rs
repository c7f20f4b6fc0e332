//! Process configuration loaded from the environment.

// std
use std::{env, net::IpAddr};
// crates.io
use tracing::info;
// self
use crate::{_prelude::*, error::ConfigError};

/// FatSecret OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth.fatsecret.com/connect/token";
/// FatSecret food API endpoint.
pub const DEFAULT_API_URL: &str = "https://platform.fatsecret.com/rest/server.api";
/// Scope requested with every client-credentials grant.
pub const DEFAULT_SCOPE: &str = "basic";
/// Listening port.
pub const DEFAULT_PORT: u16 = 3000;
/// Outbound request timeout.
pub const DEFAULT_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Runtime settings for the proxy.
#[derive(Clone)]
pub struct Config {
	/// Address the HTTP server binds to.
	pub host: IpAddr,
	/// Port the HTTP server binds to.
	pub port: u16,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Scope requested from the token endpoint.
	pub scope: String,
	/// OAuth token endpoint.
	pub token_url: Url,
	/// Food API endpoint.
	pub api_url: Url,
	/// Timeout applied to every outbound request.
	pub http_timeout: std::time::Duration,
}
impl Config {
	/// Creates a configuration with default endpoints for the given credentials.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			host: IpAddr::from([127, 0, 0, 1]),
			port: DEFAULT_PORT,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: DEFAULT_SCOPE.into(),
			token_url: default_url(DEFAULT_TOKEN_URL),
			api_url: default_url(DEFAULT_API_URL),
			http_timeout: DEFAULT_HTTP_TIMEOUT,
		}
	}

	/// Loads the configuration from environment variables.
	///
	/// `CLIENT_ID` and `CLIENT_SECRET` are required; everything else falls back to the
	/// FatSecret production defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		let client_id = required("CLIENT_ID")?;
		let client_secret = required("CLIENT_SECRET")?;
		let defaults = Self::new(client_id, client_secret);

		Ok(Self {
			host: try_load("HOST", defaults.host)?,
			port: try_load("PORT", defaults.port)?,
			scope: try_load("FATSECRET_SCOPE", defaults.scope.clone())?,
			token_url: try_load("FATSECRET_TOKEN_URL", defaults.token_url.clone())?,
			api_url: try_load("FATSECRET_API_URL", defaults.api_url.clone())?,
			http_timeout: std::time::Duration::from_secs(try_load(
				"HTTP_TIMEOUT_SECS",
				defaults.http_timeout.as_secs(),
			)?),
			..defaults
		})
	}

	/// Overrides the listening port.
	pub fn with_port(mut self, port: u16) -> Self {
		self.port = port;

		self
	}

	/// Overrides the requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the OAuth token endpoint.
	pub fn with_token_url(mut self, url: Url) -> Self {
		self.token_url = url;

		self
	}

	/// Overrides the food API endpoint.
	pub fn with_api_url(mut self, url: Url) -> Self {
		self.api_url = url;

		self
	}

	/// Overrides the outbound request timeout.
	pub fn with_http_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.http_timeout = timeout;

		self
	}
}
impl Debug for Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Config")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("scope", &self.scope)
			.field("token_url", &self.token_url.as_str())
			.field("api_url", &self.api_url.as_str())
			.field("http_timeout", &self.http_timeout)
			.finish()
	}
}

fn default_url(raw: &str) -> Url {
	// Both defaults are compile-time constants known to parse.
	Url::parse(raw).unwrap_or_else(|e| unreachable!("default endpoint `{raw}` is invalid: {e}"))
}

fn var(key: &'static str) -> Option<String> {
	env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
	var(key).ok_or(ConfigError::MissingVar { key })
}

fn try_load<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
	T: FromStr + Debug,
	T::Err: Display,
{
	match var(key) {
		Some(raw) => raw
			.trim()
			.parse()
			.map_err(|e: T::Err| ConfigError::InvalidVar { key, reason: e.to_string() }),
		None => {
			info!("{key} not set, using default: {default:?}");

			Ok(default)
		},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_point_at_fatsecret() {
		let config = Config::new("id", "secret");

		assert_eq!(config.port, 3000);
		assert_eq!(config.scope, "basic");
		assert_eq!(config.token_url.as_str(), DEFAULT_TOKEN_URL);
		assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
		assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
	}

	#[test]
	fn debug_output_redacts_secret() {
		let rendered = format!("{:?}", Config::new("visible-id", "hidden-secret"));

		assert!(rendered.contains("visible-id"));
		assert!(!rendered.contains("hidden-secret"));
	}

	#[test]
	fn builders_override_fields() {
		let token = Url::parse("http://127.0.0.1:9/token").expect("Token URL should parse.");
		let config = Config::new("id", "secret")
			.with_port(8080)
			.with_scope("premier")
			.with_token_url(token.clone())
			.with_http_timeout(std::time::Duration::from_secs(2));

		assert_eq!(config.port, 8080);
		assert_eq!(config.scope, "premier");
		assert_eq!(config.token_url, token);
		assert_eq!(config.http_timeout.as_secs(), 2);
	}
}
