//! Creates a Tink user against a local mock of the API, then reads it back through a
//! delegated `user:read` token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use tink_finance::{ClientConfig, TinkClient, model::UserSelector};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/oauth/token")
				.form_urlencoded_tuple("grant_type", "client_credentials");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "demo-app-token",
				"token_type": "bearer",
				"expires_in": 1800,
				"scope": "authorization:grant,user:create"
			}));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/user/create");
			then.status(201)
				.header("content-type", "application/json")
				.json_body(json!({ "user_id": "d9f134ee2eb44846a4e02990ecc8d32e" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/oauth/authorization-grant");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "code": "demo-code" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/oauth/token")
				.form_urlencoded_tuple("grant_type", "authorization_code");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "demo-user-token",
				"token_type": "bearer",
				"expires_in": 7200,
				"scope": "user:read"
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/user").header("authorization", "Bearer demo-user-token");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"appId": "demo-app",
				"created": 1_735_689_600_000_i64,
				"id": "d9f134ee2eb44846a4e02990ecc8d32e",
				"profile": {
					"currency": "EUR",
					"locale": "es_ES",
					"market": "ES",
					"timeZone": "Europe/Madrid"
				}
			}));
		})
		.await;

	let config = ClientConfig::builder()
		.client_id("demo-client")
		.client_secret("demo-secret")
		.base_url(server.url("/api/v1"))
		.build()?;
	let client = TinkClient::new(config)?;
	let user = client.create_user("ES", "es_ES", None).await?;

	println!("Created user {} in market {}.", user.user_id, user.market);

	let details = client.get_user_by(&UserSelector::from(user.user_id.clone())).await?;

	println!("User was created at {} with time zone {}.", details.created, details.profile.time_zone);

	token_mock.assert_async().await;

	Ok(())
}
