#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use auth_broker::{
	_preludet::*,
	error::{Error, TransportError},
	service::{OAuthOptions, ServiceBinding, ServiceRegistry},
	strategy::TokenPair,
};

const SERVICE: &str = "microblog";

fn url(value: &str) -> Url {
	Url::parse(value).expect("Mock endpoint URL should parse successfully.")
}

fn build_registry(server: &MockServer) -> ServiceRegistry {
	let registry = ServiceRegistry::new();

	registry.register(
		SERVICE,
		ServiceBinding::oauth(OAuthOptions {
			consumer_key: "consumer-it".into(),
			consumer_secret: "consumer-secret-it".into(),
			request_url: url(&server.url("/oauth/request_token")),
			authorization_url: url(&server.url("/oauth/authorize")),
			access_url: url(&server.url("/oauth/access_token")),
		}),
	);

	registry
}

#[tokio::test]
async fn request_token_fetch_yields_the_authorization_url() {
	let server = MockServer::start_async().await;
	let (factory, _registry) = build_reqwest_test_factory(build_registry(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/request_token")
				.header("content-type", "application/x-www-form-urlencoded")
				.header_exists("cookie");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token-it&oauth_token_secret=req-secret-it");
		})
		.await;
	let mut strategy =
		factory.create(SERVICE).expect("Registered OAuth service should yield a strategy.");
	let oauth = strategy.as_oauth_mut().expect("OAuth binding should yield the OAuth variant.");
	let authorization_url =
		oauth.authorization_url().await.expect("Request-token fetch should succeed.");

	mock.assert_async().await;

	assert!(authorization_url.as_str().starts_with(&server.url("/oauth/authorize")));
	assert_eq!(
		authorization_url
			.query_pairs()
			.find(|(name, _)| name == "oauth_token")
			.map(|(_, value)| value.into_owned()),
		Some("req-token-it".to_owned())
	);
	assert_eq!(
		oauth.request_token(),
		Some(&TokenPair { key: "req-token-it".into(), secret: "req-secret-it".into() })
	);
}

#[tokio::test]
async fn full_flow_signs_requests_after_the_access_exchange() {
	let server = MockServer::start_async().await;
	let (factory, _registry) = build_reqwest_test_factory(build_registry(&server));
	let request_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request_token");
			then.status(200).body("oauth_token=req-token-it&oauth_token_secret=req-secret-it");
		})
		.await;
	let access_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token").header_exists("cookie");
			then.status(200).body("oauth_token=access-token-it&oauth_token_secret=access-secret-it");
		})
		.await;
	let mut strategy =
		factory.create(SERVICE).expect("Registered OAuth service should yield a strategy.");
	let oauth = strategy.as_oauth_mut().expect("OAuth binding should yield the OAuth variant.");

	oauth.authorization_url().await.expect("Request-token fetch should succeed.");
	oauth
		.authorize_with_verifier("verifier-it")
		.await
		.expect("Access-token exchange should succeed.");

	request_mock.assert_async().await;
	access_mock.assert_async().await;

	assert_eq!(
		oauth.access_token(),
		Some(&TokenPair { key: "access-token-it".into(), secret: "access-secret-it".into() })
	);
	assert!(oauth.request_token().is_none(), "The request token is spent after the exchange.");

	let parameters = BTreeMap::from_iter([("status".to_owned(), "signed".to_owned())]);
	let header = oauth
		.sign_request("POST", &url("https://remote.example/statuses/update"), &parameters)
		.expect("Authorized strategy should sign requests.");

	assert!(header.starts_with("OAuth realm=\"microblog\""));
	assert!(header.contains("oauth_token=\"access-token-it\""));
	assert!(header.contains("oauth_consumer_key=\"consumer-it\""));
	assert!(header.contains("oauth_signature=\""));
}

#[tokio::test]
async fn failed_access_exchange_surfaces_the_body_and_keeps_prior_state() {
	let server = MockServer::start_async().await;
	let (factory, _registry) = build_reqwest_test_factory(build_registry(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token");
			then.status(401).body("Invalid signature.");
		})
		.await;
	let mut strategy =
		factory.create(SERVICE).expect("Registered OAuth service should yield a strategy.");
	let oauth = strategy.as_oauth_mut().expect("OAuth binding should yield the OAuth variant.");

	oauth.set_access_token("old-key", "old-secret");

	let err = oauth.authorize().await.expect_err("A 401 answer should surface to the caller.");

	mock.assert_async().await;

	match err {
		Error::Transport(TransportError::Endpoint { status, body }) => {
			assert_eq!(status, 401);
			assert_eq!(body, "Invalid signature.");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(
		oauth.access_token(),
		Some(&TokenPair { key: "old-key".into(), secret: "old-secret".into() }),
		"A failed exchange must not disturb a previously-installed access token.",
	);
}

#[tokio::test]
async fn failed_request_token_fetch_leaves_the_strategy_unauthorized() {
	let server = MockServer::start_async().await;
	let (factory, _registry) = build_reqwest_test_factory(build_registry(&server));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request_token");
			then.status(503).body("over capacity");
		})
		.await;

	let mut strategy =
		factory.create(SERVICE).expect("Registered OAuth service should yield a strategy.");
	let oauth = strategy.as_oauth_mut().expect("OAuth binding should yield the OAuth variant.");
	let err =
		oauth.authorization_url().await.expect_err("A 503 answer should surface to the caller.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::Endpoint { status: 503, ref body }) if body.as_str() == "over capacity"
	));
	assert!(oauth.request_token().is_none());
	assert!(
		oauth
			.sign_request("GET", &url("https://remote.example/feed"), &BTreeMap::new())
			.is_err(),
		"Signing must stay unavailable after a failed bootstrap.",
	);
}
