mod common;

// self
use common::*;
use tink_finance::{auth::IdentifierError, model::User};

#[tokio::test]
async fn create_user_returns_the_created_user() {
	let server = MockServer::start_async().await;
	let token = mock_app_token(&server, 1800).await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/user/create")
				.header("authorization", "Bearer app-token")
				.json_body(json!({ "market": "ES", "locale": "es_ES" }));
			then.status(201)
				.header("content-type", "application/json")
				.json_body(json!({ "user_id": USER_ID }));
		})
		.await;
	let client = client(&server);
	let user = client.create_user("ES", "es_ES", None).await.expect("User should be created.");

	assert_eq!(user.user_id, USER_ID);
	assert_eq!(user.market, "ES");
	assert_eq!(user.locale, "es_ES");
	assert_eq!(user.external_user_id, None);
	token.assert_calls_async(1).await;
	create.assert_calls_async(1).await;
}

#[tokio::test]
async fn create_user_sends_the_external_id() {
	let server = MockServer::start_async().await;

	mock_app_token(&server, 1800).await;

	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/user/create").json_body(json!({
				"market": "SE",
				"locale": "sv_SE",
				"external_user_id": "customer-42"
			}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"user_id": USER_ID,
				"external_user_id": "customer-42"
			}));
		})
		.await;
	let client = client(&server);
	let user = client
		.create_user("SE", "sv_SE", Some("customer-42"))
		.await
		.expect("User should be created.");

	assert_eq!(user.external_user_id.as_deref(), Some("customer-42"));
	create.assert_async().await;
}

#[tokio::test]
async fn invalid_market_fails_before_any_request() {
	let server = MockServer::start_async().await;
	let token = mock_app_token(&server, 1800).await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/user/create");
			then.status(201).json_body(json!({ "user_id": USER_ID }));
		})
		.await;
	let client = client(&server);
	let err = client
		.create_user("", "es_ES", None)
		.await
		.expect_err("Empty markets must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::Identifier(IdentifierError::Empty { kind: "Market" }))
	));

	let err = client
		.create_user("ES", "es-ES", None)
		.await
		.expect_err("Malformed locales must be rejected.");

	assert!(matches!(err, Error::Validation(_)));
	token.assert_calls_async(0).await;
	create.assert_calls_async(0).await;
}

#[tokio::test]
async fn undecodable_create_response_is_a_decode_error() {
	let server = MockServer::start_async().await;

	mock_app_token(&server, 1800).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/user/create");
			then.status(201).header("content-type", "application/json").json_body(json!({}));
		})
		.await;

	let client = client(&server);
	let err = client.create_user("ES", "es_ES", None).await.expect_err("Missing user_id must fail.");

	match err {
		Error::Api(ApiError::Decode { status, body, .. }) => {
			assert_eq!(status, 201);
			assert_eq!(body, "{}");
		},
		other => panic!("Expected a decode error, got {other:?}."),
	}
}

#[tokio::test]
async fn get_user_decodes_the_user_record() {
	let server = MockServer::start_async().await;
	let get = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/user").header("authorization", "Bearer user-token");
			then.status(200).header("content-type", "application/json").json_body(user_details_body());
		})
		.await;
	let client = client(&server);
	let details = client.get_user("user-token").await.expect("User should be fetched.");

	assert_eq!(details.id, USER_ID);
	assert_eq!(details.profile.market, "ES");
	assert!(details.profile.notification_settings.balance);
	assert_eq!(User::from(details).external_user_id.as_deref(), Some("customer-42"));
	get.assert_async().await;
}

#[tokio::test]
async fn get_and_delete_surface_not_found() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/user");
			then.status(404)
				.header("content-type", "application/json")
				.json_body(json!({ "errorMessage": "User not found" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/user/delete");
			then.status(404).body("not found");
		})
		.await;

	let client = client(&server);
	let err = client.get_user("user-token").await.expect_err("Missing user must fail.");

	assert_eq!(err.status(), Some(404));

	match err {
		Error::Api(ApiError::Status { message, .. }) =>
			assert_eq!(message.as_deref(), Some("User not found")),
		other => panic!("Expected an API error, got {other:?}."),
	}

	let err = client.delete_user("user-token").await.expect_err("Missing user must fail.");

	match err {
		Error::Api(api) => {
			assert_eq!(api.status(), 404);
			assert_eq!(api.body(), "not found");
		},
		other => panic!("Expected an API error, got {other:?}."),
	}
}

#[tokio::test]
async fn delete_user_posts_with_the_user_token() {
	let server = MockServer::start_async().await;
	let delete = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/user/delete").header("authorization", "Bearer user-token");
			then.status(204);
		})
		.await;
	let client = client(&server);

	client.delete_user("user-token").await.expect("User should be deleted.");
	delete.assert_async().await;
}

#[tokio::test]
async fn blank_user_tokens_are_rejected_locally() {
	let server = MockServer::start_async().await;
	let client = client(&server);
	let err = client.get_user("  ").await.expect_err("Blank tokens must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::EmptyCredential { field: "user_token" })
	));
}

#[tokio::test]
async fn user_tokens_unfit_for_a_header_are_rejected_locally() {
	let server = MockServer::start_async().await;
	let any = server
		.mock_async(|_, then| {
			then.status(200);
		})
		.await;
	let client = client(&server);
	let err = client.get_user("user\ntoken").await.expect_err("Control characters must be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::InvalidCredential { field: "user_token" })
	));

	let err = client.delete_user("user\u{7f}token").await.expect_err("DEL must be rejected.");

	assert!(matches!(err, Error::Validation(_)));
	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn rate_limited_calls_carry_retry_after() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/user");
			then.status(429).header("retry-after", "30").body("slow down");
		})
		.await;

	let client = client(&server);
	let err = client.get_user("user-token").await.expect_err("Rate limits must fail the call.");

	match err {
		Error::Api(ApiError::Status { status, retry_after, .. }) => {
			assert_eq!(status, 429);
			assert_eq!(retry_after, Some(Duration::seconds(30)));
		},
		other => panic!("Expected an API error, got {other:?}."),
	}
}
