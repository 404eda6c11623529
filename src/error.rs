//! Client-level error types shared by the token cache, the config layer, and API calls.

// crates.io
use reqwest::header::HeaderMap;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenBuilderError, IdentifierError, ScopeValidationError},
	http,
};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;
type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical client error exposed by public APIs.
///
/// Each variant maps to one cause so callers can branch without inspecting messages.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (missing credentials, bad base URL).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token issuance failed or returned an unusable token.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Request payload was rejected before anything was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Provider answered with a non-2xx status or an undecodable body.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Network(#[from] TransportError),
}
impl Error {
	/// HTTP status attached to the failure, when the provider answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(e) => Some(e.status()),
			Self::Authentication(AuthenticationError::Rejected { status, .. }) => *status,
			Self::Authentication(AuthenticationError::MalformedResponse { status, .. }) => *status,
			_ => None,
		}
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		ValidationError::from(e).into()
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		TransportError::from(e).into()
	}
}

/// Configuration failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Neither an explicit value nor the environment supplied a credential.
	#[error("{field} must be provided or the {env} environment variable must be set.")]
	MissingCredential {
		/// Credential field name.
		field: &'static str,
		/// Environment variable consulted as a fallback.
		env: &'static str,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value supplied by the caller or environment.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL parses but cannot host API paths.
	#[error("Base URL `{url}` must be an absolute http(s) URL.")]
	UnsupportedBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Endpoint URL derived from the base URL is invalid.
	#[error("Endpoint `{path}` is invalid.")]
	InvalidEndpoint {
		/// Path appended to the base URL.
		path: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A duration setting was negative or zero where a positive value is required.
	#[error("The {field} setting must be {requirement}.")]
	InvalidDuration {
		/// Setting name.
		field: &'static str,
		/// Human-readable requirement.
		requirement: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Token issuance failures. None of them are retried.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Token endpoint rejected the grant.
	#[error("Token endpoint rejected the {grant} grant: {reason}.")]
	Rejected {
		/// Grant label.
		grant: &'static str,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider error code (`error` or `errorCode`), when available.
		code: Option<String>,
		/// Provider- or client-supplied reason string.
		reason: String,
		/// Raw error body when it was not an OAuth error document.
		body: Option<String>,
	},
	/// Token endpoint answered 2xx with a body that is not a token response.
	#[error("Token endpoint returned a malformed {grant} response.")]
	MalformedResponse {
		/// Grant label.
		grant: &'static str,
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a zero duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned scopes that cannot be normalized.
	#[error("Token endpoint returned invalid scopes.")]
	InvalidScope(#[source] ScopeValidationError),
	/// Token could not be assembled from the response.
	#[error("Unable to build access token.")]
	TokenBuild(#[from] AccessTokenBuilderError),
}

/// Input rejected locally before any request was sent.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// Identifier, market, or locale failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
	/// Scope list failed validation.
	#[error(transparent)]
	Scope(#[from] ScopeValidationError),
	/// Neither `user_id` nor `external_user_id` was supplied.
	#[error("Either user_id or external_user_id must be provided.")]
	MissingUser,
	/// Both `user_id` and `external_user_id` were supplied.
	#[error("Cannot specify both user_id and external_user_id.")]
	AmbiguousUser,
	/// A bearer token or authorization code was empty.
	#[error("The {field} cannot be empty.")]
	EmptyCredential {
		/// Field name.
		field: &'static str,
	},
	/// A bearer token holds characters that cannot travel in an HTTP header.
	#[error("The {field} contains characters not allowed in an HTTP header.")]
	InvalidCredential {
		/// Field name.
		field: &'static str,
	},
	/// Callback query lacks a required parameter.
	#[error("Callback is missing the `{field}` parameter.")]
	MissingCallbackField {
		/// Parameter name.
		field: &'static str,
	},
	/// Callback query carries neither a code nor an error.
	#[error("Callback carries neither `code` nor `error`.")]
	UnrecognizedCallback,
}

/// Non-2xx or undecodable responses from API endpoints.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Provider answered with a non-2xx status.
	#[error("{operation} failed with HTTP {status}{}.", describe(.code, .message))]
	Status {
		/// Operation label.
		operation: &'static str,
		/// HTTP status code.
		status: u16,
		/// Provider error code, when the body carried one.
		code: Option<String>,
		/// Provider error message, when the body carried one.
		message: Option<String>,
		/// Raw response body.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider answered 2xx but the body does not match the expected model.
	#[error("{operation} returned a body that could not be decoded.")]
	Decode {
		/// Operation label.
		operation: &'static str,
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// Raw response body.
		body: String,
	},
}
impl ApiError {
	/// HTTP status code of the failed response.
	pub fn status(&self) -> u16 {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => *status,
		}
	}

	/// Raw response body.
	pub fn body(&self) -> &str {
		match self {
			Self::Status { body, .. } | Self::Decode { body, .. } => body,
		}
	}

	pub(crate) fn from_response(
		operation: &'static str,
		status: u16,
		headers: &HeaderMap,
		body: &[u8],
	) -> Self {
		let parsed = ProviderErrorBody::parse(body);

		Self::Status {
			operation,
			status,
			code: parsed.as_ref().and_then(|p| p.code.clone()),
			message: parsed.and_then(|p| p.message),
			body: String::from_utf8_lossy(body).into_owned(),
			retry_after: http::parse_retry_after(headers),
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Tink API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured connect or total timeout.
	#[error("Request to the Tink API timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the Tink API.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("Transport failed: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}

/// Error document shapes returned by Tink: its own `errorCode`/`errorMessage` pair or the
/// OAuth `error`/`error_description` pair.
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderErrorBody {
	#[serde(default, alias = "errorCode", alias = "error")]
	pub(crate) code: Option<String>,
	#[serde(default, alias = "errorMessage", alias = "error_description")]
	pub(crate) message: Option<String>,
}
impl ProviderErrorBody {
	pub(crate) fn parse(body: &[u8]) -> Option<Self> {
		serde_json::from_slice::<Self>(body).ok().filter(|p| p.code.is_some() || p.message.is_some())
	}
}

fn describe(code: &Option<String>, message: &Option<String>) -> String {
	match (code, message) {
		(Some(code), Some(message)) => format!(" ({code}: {message})"),
		(Some(text), None) | (None, Some(text)) => format!(" ({text})"),
		(None, None) => String::new(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_error_body_reads_both_shapes() {
		let tink = ProviderErrorBody::parse(br#"{"errorCode":"user.not_found","errorMessage":"No such user"}"#)
			.expect("Tink error document should parse.");

		assert_eq!(tink.code.as_deref(), Some("user.not_found"));
		assert_eq!(tink.message.as_deref(), Some("No such user"));

		let oauth = ProviderErrorBody::parse(br#"{"error":"invalid_client","error_description":"Bad secret"}"#)
			.expect("OAuth error document should parse.");

		assert_eq!(oauth.code.as_deref(), Some("invalid_client"));
		assert_eq!(oauth.message.as_deref(), Some("Bad secret"));
		assert!(ProviderErrorBody::parse(b"<html>bad gateway</html>").is_none());
		assert!(ProviderErrorBody::parse(b"{}").is_none());
	}

	#[test]
	fn api_error_display_includes_provider_detail() {
		let err = ApiError::from_response(
			"get_user",
			404,
			&HeaderMap::new(),
			br#"{"errorMessage":"User not found"}"#,
		);

		assert_eq!(err.status(), 404);
		assert_eq!(err.to_string(), "get_user failed with HTTP 404 (User not found).");
		assert_eq!(Error::from(err).status(), Some(404));
	}
}
