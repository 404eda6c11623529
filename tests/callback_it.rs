// crates.io
use url::Url;
// self
use tink_finance::{
	error::ValidationError,
	model::{CallbackResult, USER_CANCELLED},
};

fn parse(url: &str) -> Result<CallbackResult, ValidationError> {
	CallbackResult::from_url(&Url::parse(url).expect("Callback fixture should parse."))
}

#[test]
fn success_redirect_carries_code_and_credentials() {
	let result = parse("https://app.example/callback?code=abc123&credentials_id=cred-9&state=xyz")
		.expect("Success redirect should parse.");

	assert!(result.is_success());
	assert!(!result.is_user_cancelled());
	assert_eq!(result.state(), Some("xyz"));

	match result {
		CallbackResult::Success(success) => {
			assert_eq!(success.code.expose(), "abc123");
			assert_eq!(success.credentials_id, "cred-9");
		},
		other => panic!("Expected a success redirect, got {other:?}."),
	}
}

#[test]
fn cancelled_redirect_is_flagged() {
	let result = parse(
		"https://app.example/callback?error=USER_CANCELLED&error_reason=USER_CANCELLED&message=Cancelled%20by%20user&tracking_id=t-1",
	)
	.expect("Cancellation redirect should parse.");

	assert!(!result.is_success());
	assert!(result.is_user_cancelled());

	match result {
		CallbackResult::Failure(failure) => {
			assert_eq!(failure.error, USER_CANCELLED);
			assert_eq!(failure.message, "Cancelled by user");
			assert_eq!(failure.tracking_id, "t-1");
			assert_eq!(failure.provider_name, None);
		},
		other => panic!("Expected a failure redirect, got {other:?}."),
	}
}

#[test]
fn authentication_failure_keeps_optional_details() {
	let result = CallbackResult::from_query([
		("error", "AUTHENTICATION_ERROR"),
		("error_reason", "INVALID_CREDENTIALS"),
		("message", "Wrong password"),
		("tracking_id", "t-2"),
		("error_type", "USER_LOGIN_ERROR"),
		("provider_name", "es-demobank-password"),
		("credentials", "cred-1"),
	])
	.expect("Failure redirect should parse.");

	assert!(!result.is_user_cancelled());

	let CallbackResult::Failure(failure) = result else {
		panic!("Expected a failure redirect.");
	};

	assert_eq!(failure.error_type.as_deref(), Some("USER_LOGIN_ERROR"));
	assert_eq!(failure.provider_name.as_deref(), Some("es-demobank-password"));
	assert_eq!(failure.credentials.as_deref(), Some("cred-1"));
}

#[test]
fn incomplete_redirects_are_rejected() {
	assert!(matches!(
		parse("https://app.example/callback?code=abc123"),
		Err(ValidationError::MissingCallbackField { field: "credentials_id" })
	));
	assert!(matches!(
		parse("https://app.example/callback?error=BAD_REQUEST&message=oops&tracking_id=t"),
		Err(ValidationError::MissingCallbackField { field: "error_reason" })
	));
	assert!(matches!(
		parse("https://app.example/callback?state=xyz"),
		Err(ValidationError::UnrecognizedCallback)
	));
}
