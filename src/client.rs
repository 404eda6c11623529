//! Tink API client: token cache, endpoint table, and the shared request path.
//!
//! [`TinkClient`] is cheap to clone; clones share one HTTP connection pool and one app token
//! cache. Every public operation validates its input first, then resolves a bearer token
//! (cached app token or caller-supplied user token), sends one request, and maps the answer
//! into a typed model or an [`Error`].

mod delegation;
mod user;

// crates.io
use reqwest::{RequestBuilder, header::{AUTHORIZATION, HeaderValue}};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	config::ClientConfig,
	error::{ApiError, ValidationError},
	http::ReqwestHttpClient,
	oauth::TokenEndpoint,
	obs::OperationKind,
	token::TokenManager,
};

const TOKEN_PATH: &str = "/oauth/token";
const AUTHORIZATION_GRANT_PATH: &str = "/oauth/authorization-grant";
const USER_PATH: &str = "/user";
const CREATE_USER_PATH: &str = "/user/create";
const DELETE_USER_PATH: &str = "/user/delete";

/// Async client for the Tink user-management API.
#[derive(Clone, Debug)]
pub struct TinkClient {
	inner: Arc<ClientInner>,
}
impl TinkClient {
	/// Builds a client whose HTTP transport honors the configured timeouts.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Self::with_http_client(config, http_client)
	}

	/// Builds a client from `TINK_CLIENT_ID`, `TINK_CLIENT_SECRET`, and `TINK_BASE_URL`.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?)
	}

	/// Builds a client on top of a caller-provided transport.
	///
	/// The transport's own timeout settings apply; those in `config` are ignored.
	pub fn with_http_client(config: ClientConfig, http_client: ReqwestHttpClient) -> Result<Self> {
		let endpoints = Endpoints::resolve(&config)?;
		let token_endpoint =
			TokenEndpoint::new(endpoints.token.clone(), &config.credentials, http_client.clone())?;
		let tokens = TokenManager::new(token_endpoint, config.token_safety_margin);

		Ok(Self { inner: Arc::new(ClientInner { config, http_client, endpoints, tokens }) })
	}

	/// Resolved configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// App token cache shared by every clone of this client.
	pub fn tokens(&self) -> &TokenManager {
		&self.inner.tokens
	}

	fn endpoints(&self) -> &Endpoints {
		&self.inner.endpoints
	}

	/// Sends a request authorized with the cached app token.
	///
	/// A 401 answer drops the cached token, unless another call already replaced it, so the next
	/// call issues a fresh one. The failing call itself is not retried.
	async fn send_with_app_token<F>(
		&self,
		operation: OperationKind,
		scope: &ScopeSet,
		build: F,
	) -> Result<ApiResponse>
	where
		F: FnOnce(&ReqwestClient) -> RequestBuilder,
	{
		let token = self.inner.tokens.get_token(scope).await?;
		let request =
			build(&self.inner.http_client).header(AUTHORIZATION, token.authorization_value());

		match self.send(operation, request).await {
			Err(Error::Api(err)) if err.status() == 401 => {
				self.inner.tokens.invalidate_if(&token).await;

				Err(err.into())
			},
			result => result,
		}
	}

	/// Sends a request authorized with a caller-supplied user token.
	async fn send_with_user_token<F>(
		&self,
		operation: OperationKind,
		user_token: &str,
		build: F,
	) -> Result<ApiResponse>
	where
		F: FnOnce(&ReqwestClient) -> RequestBuilder,
	{
		let user_token = user_token.trim();

		if user_token.is_empty() {
			return Err(ValidationError::EmptyCredential { field: "user_token" }.into());
		}

		let authorization = HeaderValue::from_str(&format!("Bearer {user_token}"))
			.map_err(|_| ValidationError::InvalidCredential { field: "user_token" })?;
		let request = build(&self.inner.http_client).header(AUTHORIZATION, authorization);

		self.send(operation, request).await
	}

	/// Executes `request` and returns the body of a 2xx answer.
	async fn send(&self, operation: OperationKind, request: RequestBuilder) -> Result<ApiResponse> {
		let response = request.send().await?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await?;

		if !status.is_success() {
			return Err(
				ApiError::from_response(operation.as_str(), status.as_u16(), &headers, &body).into()
			);
		}

		Ok(ApiResponse { operation, status: status.as_u16(), body: body.to_vec() })
	}
}

#[derive(Debug)]
struct ClientInner {
	config: ClientConfig,
	http_client: ReqwestHttpClient,
	endpoints: Endpoints,
	tokens: TokenManager,
}

#[derive(Debug)]
struct Endpoints {
	token: Url,
	authorization_grant: Url,
	user: Url,
	create_user: Url,
	delete_user: Url,
}
impl Endpoints {
	fn resolve(config: &ClientConfig) -> Result<Self> {
		Ok(Self {
			token: config.endpoint(TOKEN_PATH)?,
			authorization_grant: config.endpoint(AUTHORIZATION_GRANT_PATH)?,
			user: config.endpoint(USER_PATH)?,
			create_user: config.endpoint(CREATE_USER_PATH)?,
			delete_user: config.endpoint(DELETE_USER_PATH)?,
		})
	}
}

/// Successful answer from an API endpoint.
#[derive(Debug)]
struct ApiResponse {
	operation: OperationKind,
	status: u16,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Decodes the JSON body, reporting the failing path on mismatch.
	fn decode<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			ApiError::Decode {
				operation: self.operation.as_str(),
				status: self.status,
				source,
				body: String::from_utf8_lossy(&self.body).into_owned(),
			}
			.into()
		})
	}
}
