// std
use std::collections::HashMap;
// self
use tink_finance::{
	ClientConfig, Error, TinkClient,
	config::{BASE_URL_ENV, CLIENT_ID_ENV, CLIENT_SECRET_ENV},
	error::ConfigError,
};

#[test]
fn missing_credentials_fail_with_configuration_error() {
	let env = HashMap::<String, String>::new();
	let err = ClientConfig::builder()
		.resolve(&env)
		.expect_err("Config without any credentials must fail.");

	assert!(matches!(err, ConfigError::MissingCredential { env: CLIENT_ID_ENV, .. }));

	let err = ClientConfig::builder()
		.client_id("id")
		.build()
		.map_err(Error::from)
		.and_then(TinkClient::new)
		.expect_err("A missing secret must fail construction.");

	assert!(matches!(err, Error::Config(ConfigError::MissingCredential { field: "client_secret", .. })));
}

#[test]
fn environment_fills_credentials_and_host() {
	let env = HashMap::from([
		(CLIENT_ID_ENV, "env-id"),
		(CLIENT_SECRET_ENV, "env-secret"),
		(BASE_URL_ENV, "https://sandbox.tink.test/api/v1"),
	]);
	let config = ClientConfig::builder().resolve(&env).expect("Environment config should resolve.");
	let client = TinkClient::new(config).expect("Client should build from the environment.");

	assert_eq!(client.config().credentials.client_id, "env-id");
	assert_eq!(client.config().base_url.as_str(), "https://sandbox.tink.test/api/v1");
	assert_eq!(
		client.tokens().endpoint().token_url().as_str(),
		"https://sandbox.tink.test/api/v1/oauth/token"
	);
}

#[test]
fn client_debug_output_hides_the_secret() {
	let config = ClientConfig::builder()
		.client_id("id")
		.client_secret("top-secret")
		.build()
		.expect("Config should build.");
	let client = TinkClient::new(config).expect("Client should build.");

	assert!(!format!("{client:?}").contains("top-secret"));
}
