//! Tink Link redirect parsing.
//!
//! After the end user finishes (or abandons) Tink Link, Tink redirects to the app's callback
//! URI with either a `code` or an `error` in the query string.

// self
use crate::{_prelude::*, auth::Secret, error::ValidationError};

/// `error` value Tink sends when the user closes Tink Link.
pub const USER_CANCELLED: &str = "USER_CANCELLED";

/// Successful Tink Link redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackSuccess {
	/// Authorization code to exchange for a user token.
	pub code: Secret,
	/// Identifier of the credentials created during the flow.
	pub credentials_id: String,
	/// Opaque state echoed back from the Tink Link URL.
	pub state: Option<String>,
}

/// Failed Tink Link redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackFailure {
	/// Error category, e.g. `USER_CANCELLED` or `AUTHENTICATION_ERROR`.
	pub error: String,
	/// Specific cause.
	pub error_reason: String,
	/// Localized, user-facing message.
	pub message: String,
	/// Tink's identifier for this error, useful for support requests.
	pub tracking_id: String,
	/// Credentials identifier, when credentials were created before the failure.
	pub credentials: Option<String>,
	/// Authentication error type, set when `error` is `AUTHENTICATION_ERROR`.
	pub error_type: Option<String>,
	/// Selected bank connection.
	pub provider_name: Option<String>,
	/// Payment request identifier for payment initiation flows.
	pub payment_request_id: Option<String>,
	/// Opaque state echoed back from the Tink Link URL.
	pub state: Option<String>,
}

/// Parsed Tink Link redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackResult {
	/// The user completed the flow.
	Success(CallbackSuccess),
	/// The flow ended with an error or a cancellation.
	Failure(CallbackFailure),
}
impl CallbackResult {
	/// Parses the query string of a redirect URL.
	pub fn from_url(url: &Url) -> Result<Self, ValidationError> {
		Self::from_query(url.query_pairs())
	}

	/// Parses decoded query pairs. A `code` wins over an `error` when both are present.
	pub fn from_query<I, K, V>(pairs: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut params = pairs
			.into_iter()
			.map(|(key, value)| (key.as_ref().to_owned(), value.as_ref().to_owned()))
			.filter(|(_, value)| !value.is_empty())
			.collect::<HashMap<_, _>>();
		let mut take = |field: &'static str| params.remove(field);

		if let Some(code) = take("code") {
			return Ok(Self::Success(CallbackSuccess {
				code: Secret::new(code),
				credentials_id: take("credentials_id")
					.ok_or(ValidationError::MissingCallbackField { field: "credentials_id" })?,
				state: take("state"),
			}));
		}

		let Some(error) = take("error") else {
			return Err(ValidationError::UnrecognizedCallback);
		};
		let mut required = |field: &'static str| {
			take(field).ok_or(ValidationError::MissingCallbackField { field })
		};
		let error_reason = required("error_reason")?;
		let message = required("message")?;
		let tracking_id = required("tracking_id")?;

		Ok(Self::Failure(CallbackFailure {
			error,
			error_reason,
			message,
			tracking_id,
			credentials: take("credentials"),
			error_type: take("error_type"),
			provider_name: take("provider_name"),
			payment_request_id: take("payment_request_id"),
			state: take("state"),
		}))
	}

	/// Returns `true` for a successful redirect.
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	/// Returns `true` when the user closed Tink Link.
	pub fn is_user_cancelled(&self) -> bool {
		matches!(self, Self::Failure(failure) if failure.error == USER_CANCELLED)
	}

	/// State echoed back from the Tink Link URL.
	pub fn state(&self) -> Option<&str> {
		match self {
			Self::Success(success) => success.state.as_deref(),
			Self::Failure(failure) => failure.state.as_deref(),
		}
	}
}
