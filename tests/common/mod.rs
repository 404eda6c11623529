#![allow(dead_code)]

// std
pub use std::time::Duration as StdDuration;
// crates.io
pub use httpmock::{Mock, prelude::*};
pub use serde_json::json;
pub use time::Duration;
// self
pub use tink_finance::{
	Error, TinkClient,
	auth::ScopeSet,
	config::{ClientConfig, ClientConfigBuilder},
	error::{ApiError, AuthenticationError, ConfigError, TransportError, ValidationError},
	model::UserSelector,
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const APP_TOKEN: &str = "app-token";
pub const USER_ID: &str = "d9f134ee2eb44846a4e02990ecc8d32e";

/// Builds a client against the mock server with default settings.
pub fn client(server: &MockServer) -> TinkClient {
	client_with(server, |builder| builder)
}

/// Builds a client against the mock server after adjusting the config builder.
pub fn client_with<F>(server: &MockServer, configure: F) -> TinkClient
where
	F: FnOnce(ClientConfigBuilder) -> ClientConfigBuilder,
{
	let builder = ClientConfig::builder()
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.base_url(server.url("/api/v1"));
	let config = configure(builder).build().expect("Mock client config should build.");

	TinkClient::new(config).expect("Mock client should build.")
}

/// Mocks the client-credentials grant with the given lifetime.
pub async fn mock_app_token(server: &MockServer, expires_in: u64) -> Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/oauth/token")
				.form_urlencoded_tuple("grant_type", "client_credentials")
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": APP_TOKEN,
				"token_type": "bearer",
				"expires_in": expires_in,
				"scope": "authorization:grant,user:create"
			}));
		})
		.await
}

/// `GET /user` body for [`USER_ID`].
pub fn user_details_body() -> serde_json::Value {
	json!({
		"appId": "app-1",
		"created": 1_735_689_600_000_i64,
		"externalUserId": "customer-42",
		"flags": [],
		"id": USER_ID,
		"nationalId": null,
		"profile": {
			"currency": "EUR",
			"locale": "es_ES",
			"market": "ES",
			"notificationSettings": { "balance": true },
			"periodAdjustedDay": 25,
			"periodMode": "MONTHLY_ADJUSTED",
			"timeZone": "Europe/Madrid",
			"periodSettings": { "mode": "MONTHLY_ADJUSTED", "adjustedPeriodDay": 25 }
		},
		"username": null
	})
}
