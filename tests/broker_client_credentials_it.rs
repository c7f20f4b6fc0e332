// crates.io
use httpmock::prelude::*;
// self
use fatsecret_proxy::{_preludet::*, auth::Clock, error::Error};

const TOKEN_PATH: &str = "/connect/token";
const BASIC_AUTH: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> httpmock::Mock<'a> {
	let body = format!(
		"{{\"access_token\":\"{token}\",\"token_type\":\"Bearer\",\"expires_in\":{expires_in},\"scope\":\"basic\"}}"
	);

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("authorization", BASIC_AUTH)
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "client_credentials")
				.form_urlencoded_tuple("scope", "basic");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn token_is_reused_until_adjusted_expiry() {
	let server = MockServer::start_async().await;
	let (proxy, clock) = build_test_proxy(&server.base_url());
	let mock = mock_token(&server, "token-1", 120).await;
	let first = proxy.broker.access_token().await.expect("First token request should succeed.");

	assert_eq!(first.expose(), "token-1");

	mock.assert_calls_async(1).await;

	clock.advance(Duration::seconds(59));

	let second =
		proxy.broker.access_token().await.expect("Token should be served from the cache.");

	assert_eq!(second.expose(), "token-1");

	mock.assert_calls_async(1).await;

	clock.advance(Duration::seconds(2));
	proxy.broker.access_token().await.expect("Expired token should be replaced.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn cached_record_expires_sixty_seconds_early() {
	let server = MockServer::start_async().await;
	let (proxy, clock) = build_test_proxy(&server.base_url());
	let _mock = mock_token(&server, "token-3600", 3600).await;
	let record = proxy.broker.token_record().await.expect("Token request should succeed.");

	assert_eq!(record.issued_at, clock.now());
	assert_eq!(record.expires_at - record.issued_at, Duration::seconds(3540));
	assert_eq!(proxy.broker.cache.peek().map(|cached| cached.expires_at), Some(record.expires_at));
}

#[tokio::test]
async fn invalidate_forces_a_new_grant() {
	let server = MockServer::start_async().await;
	let (proxy, _clock) = build_test_proxy(&server.base_url());
	let mock = mock_token(&server, "token-1", 3600).await;

	proxy.broker.access_token().await.expect("Initial token request should succeed.");
	proxy.broker.invalidate();
	proxy.broker.access_token().await.expect("Token request after invalidation should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn token_endpoint_rejection_surfaces_as_upstream_auth() {
	let server = MockServer::start_async().await;
	let (proxy, _clock) = build_test_proxy(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let err = proxy.broker.access_token().await.expect_err("Rejected credentials should fail.");

	mock.assert_calls_async(1).await;

	assert!(matches!(err, Error::UpstreamAuth { .. }));
	assert_eq!(err.upstream_status(), Some(401));
	assert!(err.to_string().contains("invalid_client"));
	assert!(proxy.broker.cache.peek().is_none());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_record() {
	let server = MockServer::start_async().await;
	let (proxy, clock) = build_test_proxy(&server.base_url());
	let mut ok = mock_token(&server, "token-old", 120).await;
	let original = proxy.broker.token_record().await.expect("Initial token request should succeed.");

	ok.delete_async().await;

	let failing = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500).body("upstream exploded");
		})
		.await;

	clock.advance(Duration::seconds(61));

	let err = proxy.broker.access_token().await.expect_err("Refresh against a 500 should fail.");

	failing.assert_calls_async(1).await;

	assert!(matches!(err, Error::UpstreamAuth { status: Some(500), .. }));
	assert_eq!(
		proxy.broker.cache.peek().map(|record| record.access_token.expose().to_owned()),
		Some(original.access_token.expose().to_owned())
	);
}

#[tokio::test]
async fn missing_expires_in_is_rejected() {
	let server = MockServer::start_async().await;
	let (proxy, _clock) = build_test_proxy(&server.base_url());
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"no-expiry\",\"token_type\":\"Bearer\"}");
		})
		.await;
	let err =
		proxy.broker.access_token().await.expect_err("Token without expires_in should fail.");

	assert!(matches!(err, Error::UpstreamAuth { .. }));
	assert!(err.to_string().contains("expires_in"));
}

#[tokio::test]
async fn oversized_expires_in_is_rejected() {
	let server = MockServer::start_async().await;
	let (proxy, _clock) = build_test_proxy(&server.base_url());
	let _mock = mock_token(&server, "forever", 100_000_000_000_000).await;
	let err = proxy
		.broker
		.access_token()
		.await
		.expect_err("An expiry beyond the calendar range should fail.");

	assert!(matches!(err, Error::UpstreamAuth { status: None, .. }));
	assert!(err.to_string().contains("expires_in"));
	assert!(proxy.broker.cache.peek().is_none());
}

#[tokio::test]
async fn empty_access_token_is_rejected() {
	let server = MockServer::start_async().await;
	let (proxy, _clock) = build_test_proxy(&server.base_url());
	let _mock = mock_token(&server, "", 3600).await;
	let err = proxy.broker.access_token().await.expect_err("An empty token should fail.");

	assert!(matches!(err, Error::UpstreamAuth { .. }));
	assert!(err.to_string().contains("Access token is required."));
	assert!(proxy.broker.cache.peek().is_none());
}
