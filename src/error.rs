//! Proxy-level error types shared across the token broker, the platform client, and the
//! HTTP boundary.

// self
use crate::_prelude::*;

/// Proxy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical proxy error exposed by public APIs.
///
/// Variants split client input problems from upstream failures so the HTTP boundary can pick
/// a status code without inspecting messages.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A required query parameter was absent or empty.
	#[error("Missing ?{name} parameter")]
	MissingParameter {
		/// Query parameter name.
		name: &'static str,
	},
	/// A query parameter was present but could not be used.
	#[error("Invalid ?{name} parameter: {reason}")]
	InvalidParameter {
		/// Query parameter name.
		name: &'static str,
		/// Human-readable explanation.
		reason: String,
	},
	/// The OAuth token endpoint rejected the request or could not be reached.
	#[error("{}", describe_upstream("token endpoint", *status, message))]
	UpstreamAuth {
		/// HTTP status code returned by the token endpoint, when one was received.
		status: Option<u16>,
		/// Upstream error text.
		message: String,
	},
	/// The food API rejected the request or could not be reached.
	#[error("{}", describe_upstream("food API", *status, message))]
	UpstreamRequest {
		/// HTTP status code returned by the food API, when one was received.
		status: Option<u16>,
		/// Upstream error text.
		message: String,
	},
	/// Unexpected failure that fits no other category.
	#[error("{message}")]
	Internal {
		/// Failure description.
		message: String,
	},
}
impl Error {
	/// Builds an [`Error::MissingParameter`].
	pub fn missing(name: &'static str) -> Self {
		Self::MissingParameter { name }
	}

	/// Builds an [`Error::InvalidParameter`].
	pub fn invalid(name: &'static str, reason: impl Display) -> Self {
		Self::InvalidParameter { name, reason: reason.to_string() }
	}

	/// Builds an [`Error::Internal`] from any displayable failure.
	pub fn internal(reason: impl Display) -> Self {
		Self::Internal { message: reason.to_string() }
	}

	/// Returns `true` for errors caused by the caller's input.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::MissingParameter { .. } | Self::InvalidParameter { .. })
	}

	/// Returns `true` for failures reported by (or while reaching) an upstream endpoint.
	pub fn is_upstream_error(&self) -> bool {
		matches!(self, Self::UpstreamAuth { .. } | Self::UpstreamRequest { .. })
	}

	/// HTTP status code reported by the upstream, if any.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			Self::UpstreamAuth { status, .. } | Self::UpstreamRequest { status, .. } => *status,
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while assembling the proxy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required environment variable is not set.
	#[error("Environment variable `{key}` is required.")]
	MissingVar {
		/// Variable name.
		key: &'static str,
	},
	/// An environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{key}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		key: &'static str,
		/// Parser failure text.
		reason: String,
	},
	/// Endpoint URL cannot be used by the OAuth client.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Listener could not bind the configured address.
	#[error("Failed to bind {address}.")]
	Bind {
		/// Address the server tried to listen on.
		address: std::net::SocketAddr,
		/// Underlying socket failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

fn describe_upstream(endpoint: &str, status: Option<u16>, message: &str) -> String {
	match status {
		Some(code) => format!("{endpoint} returned HTTP {code}: {message}"),
		None => format!("{endpoint} unreachable: {message}"),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn missing_parameter_matches_wire_text() {
		assert_eq!(Error::missing("q").to_string(), "Missing ?q parameter");
		assert_eq!(Error::missing("id").to_string(), "Missing ?id parameter");
	}

	#[test]
	fn upstream_messages_carry_status_when_known() {
		let err = Error::UpstreamAuth { status: Some(401), message: "invalid_client".into() };

		assert_eq!(err.to_string(), "token endpoint returned HTTP 401: invalid_client");
		assert_eq!(err.upstream_status(), Some(401));
		assert!(err.is_upstream_error());
		assert!(!err.is_client_error());

		let err = Error::UpstreamRequest { status: None, message: "connection refused".into() };

		assert_eq!(err.to_string(), "food API unreachable: connection refused");
	}
}
