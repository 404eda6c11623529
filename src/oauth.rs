//! Token endpoint facade over the `oauth2` crate.
//!
//! Tink authenticates clients with `client_id`/`client_secret` form fields and expects scopes
//! joined with commas, so the facade always uses request-body client auth and sends `scope` as
//! an extra parameter instead of letting `oauth2` space-join it.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenBuilderError, ScopeSet},
	config::Credentials,
	error::{AuthenticationError, ConfigError, ProviderErrorBody, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Grant types this client performs against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// App-level token for the client itself.
	ClientCredentials,
	/// User token minted from an authorization code.
	AuthorizationCode,
}
impl GrantType {
	/// Returns the OAuth `grant_type` value.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::AuthorizationCode => "authorization_code",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Performs grants against Tink's `/oauth/token` endpoint.
#[derive(Clone)]
pub struct TokenEndpoint {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	token_url: Url,
}
impl TokenEndpoint {
	/// Creates a facade for the token URL using request-body client authentication.
	pub fn new(
		token_url: Url,
		credentials: &Credentials,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let token_uri = TokenUrl::new(token_url.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { path: "/oauth/token", source })?;
		let oauth_client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_uri);

		Ok(Self { oauth_client, http_client, token_url })
	}

	/// Token endpoint URL.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Performs the `client_credentials` grant for `scope`.
	pub async fn client_credentials(
		&self,
		scope: &ScopeSet,
		safety_margin: Duration,
	) -> Result<AccessToken> {
		const GRANT: GrantType = GrantType::ClientCredentials;

		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		if !scope.is_empty() {
			request = request.add_extra_param("scope", scope.normalized());
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GRANT, meta.take(), err))?;

		map_token_response(scope, response, safety_margin)
	}

	/// Exchanges a user authorization code for a user token.
	pub async fn authorization_code(
		&self,
		code: &str,
		safety_margin: Duration,
	) -> Result<AccessToken> {
		const GRANT: GrantType = GrantType::AuthorizationCode;

		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GRANT, meta.take(), err))?;

		map_token_response(&ScopeSet::default(), response, safety_margin)
	}
}
impl Debug for TokenEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpoint").field("token_url", &self.token_url.as_str()).finish()
	}
}

fn map_token_response(
	requested: &ScopeSet,
	response: BasicTokenResponse,
	safety_margin: Duration,
) -> Result<AccessToken> {
	let expires_in =
		response.expires_in().ok_or(AuthenticationError::MissingExpiresIn)?.as_secs();
	let expires_in =
		i64::try_from(expires_in).map_err(|_| AuthenticationError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(AuthenticationError::NonPositiveExpiresIn.into());
	}

	let scope = match response.scopes() {
		Some(scopes) => ScopeSet::from_fragments(scopes.iter().map(|scope| scope.as_str()))
			.map_err(AuthenticationError::InvalidScope)?,
		None => requested.clone(),
	};

	AccessToken::builder(scope)
		.access_token(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref())
		.issued_now()
		.expires_in(Duration::seconds(expires_in))
		.safety_margin(safety_margin)
		.build()
		.map_err(|err| match err {
			AccessTokenBuilderError::ExpiryOutOfRange =>
				AuthenticationError::ExpiresInOutOfRange.into(),
			other => AuthenticationError::from(other).into(),
		})
}

fn map_request_error(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.as_ref().and_then(|meta| meta.status);
	let grant = grant.as_str();

	match err {
		RequestTokenError::ServerResponse(response) => {
			let code = response.error().as_ref().to_owned();
			let reason = response.error_description().cloned().unwrap_or_else(|| code.clone());

			AuthenticationError::Rejected { grant, status, code: Some(code), reason, body: None }
				.into()
		},
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, body) => match status {
			Some(code) if !(200..300).contains(&code) => {
				let parsed = ProviderErrorBody::parse(&body);
				let reason = parsed
					.as_ref()
					.and_then(|p| p.message.clone())
					.unwrap_or_else(|| format!("HTTP {code}"));

				AuthenticationError::Rejected {
					grant,
					status,
					code: parsed.and_then(|p| p.code),
					reason,
					body: Some(String::from_utf8_lossy(&body).into_owned()),
				}
				.into()
			},
			_ => AuthenticationError::MalformedResponse { grant, source, status }.into(),
		},
		RequestTokenError::Other(message) =>
			AuthenticationError::Rejected { grant, status, code: None, reason: message, body: None }
				.into(),
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: "unrecognized transport failure".into() }.into(),
	}
}
