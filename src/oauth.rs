//! Client-credentials exchange against the FatSecret token endpoint, built on the `oauth2`
//! crate.

pub use oauth2;

// crates.io
use oauth2::{
	ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RequestTokenError,
	Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	error::ConfigError,
	http::{self, ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth client bound to one token endpoint and one set of client credentials.
///
/// Credentials travel as HTTP basic auth (`oauth2`'s default), the form carries
/// `grant_type=client_credentials` plus the configured scope.
pub struct TokenFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	token_url: Url,
	client_id: String,
	scope: String,
}
impl TokenFacade {
	/// Builds a facade for `token_url` with the given credentials.
	pub fn new(
		token_url: &Url,
		client_id: &str,
		client_secret: &str,
		scope: impl Into<String>,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let oauth_token_url = TokenUrl::new(token_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_token_uri(oauth_token_url);

		Ok(Self {
			oauth_client,
			http_client,
			token_url: token_url.to_owned(),
			client_id: client_id.to_owned(),
			scope: scope.into(),
		})
	}

	/// Requests a new access token, stamping the record with `issued_at`.
	pub async fn exchange_client_credentials(
		&self,
		issued_at: OffsetDateTime,
	) -> Result<TokenRecord> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		if !self.scope.is_empty() {
			request = request.add_scope(Scope::new(self.scope.clone()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;
		let expires_in = response.expires_in().ok_or_else(|| Error::UpstreamAuth {
			status: None,
			message: "token response is missing expires_in".into(),
		})?;
		let expires_in = i64::try_from(expires_in.as_secs()).map_err(|_| Error::UpstreamAuth {
			status: None,
			message: "token response expires_in is out of range".into(),
		})?;

		TokenRecord::builder()
			.access_token(response.access_token().secret().to_owned())
			.issued_at(issued_at)
			.expires_in(Duration::seconds(expires_in))
			.build()
			.map_err(|err| Error::UpstreamAuth { status: None, message: err.to_string() })
	}
}
impl Debug for TokenFacade {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenFacade")
			.field("token_url", &self.token_url.as_str())
			.field("client_id", &self.client_id)
			.field("scope", &self.scope)
			.finish()
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			Error::UpstreamAuth { status, message: describe_oauth_error(&response) },
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(error, body) => Error::UpstreamAuth {
			status,
			message: if body.is_empty() {
				format!("unreadable token response ({error})")
			} else {
				http::body_preview(&body)
			},
		},
		RequestTokenError::Other(message) => Error::UpstreamAuth { status, message },
	}
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> Error {
	let message = match err {
		HttpClientError::Reqwest(inner) if inner.is_timeout() =>
			"request timed out while calling the token endpoint".into(),
		HttpClientError::Reqwest(inner) => inner.to_string(),
		HttpClientError::Http(inner) => inner.to_string(),
		HttpClientError::Io(inner) => inner.to_string(),
		HttpClientError::Other(message) => message,
		_ => "unknown transport failure while calling the token endpoint".into(),
	};

	Error::UpstreamAuth { status, message }
}

fn describe_oauth_error(response: &BasicErrorResponse) -> String {
	match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	}
}
