//! Client configuration: credentials, API host, timeouts, and the token safety margin.
//!
//! Explicit builder values always win. [`ClientConfigBuilder::resolve`] fills whatever is left
//! from an [`EnvSource`], which is consulted once while the config is built and never again.

// std
use std::{borrow::Borrow, hash::BuildHasher};
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.tink.com/api/v1";
/// Environment variable holding the client identifier.
pub const CLIENT_ID_ENV: &str = "TINK_CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_ENV: &str = "TINK_CLIENT_SECRET";
/// Environment variable overriding the API host.
pub const BASE_URL_ENV: &str = "TINK_BASE_URL";

/// Read-only view of process-style environment variables.
pub trait EnvSource {
	/// Returns the value for `key`, if set.
	fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;
impl EnvSource for ProcessEnv {
	fn var(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}
}

/// [`EnvSource`] that never yields a value.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEnv;
impl EnvSource for NoEnv {
	fn var(&self, _key: &str) -> Option<String> {
		None
	}
}

impl<K, V, S> EnvSource for HashMap<K, V, S>
where
	K: Borrow<str> + std::hash::Hash + Eq,
	V: AsRef<str>,
	S: BuildHasher,
{
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).map(|value| value.as_ref().to_owned())
	}
}

/// OAuth client credentials, immutable for the lifetime of a client.
#[derive(Clone)]
pub struct Credentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
}
impl Credentials {
	/// Wraps an identifier/secret pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}

/// Fully resolved client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Client credentials used for every token request.
	pub credentials: Credentials,
	/// API host including the version prefix, without a trailing slash.
	pub base_url: Url,
	/// Total per-request timeout.
	pub timeout: StdDuration,
	/// TCP/TLS connect timeout.
	pub connect_timeout: StdDuration,
	/// Margin subtracted from each token lifetime before it is considered expired.
	pub token_safety_margin: Duration,
}
impl ClientConfig {
	/// Default total per-request timeout.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);
	/// Default connect timeout.
	pub const DEFAULT_CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);
	/// Default token safety margin.
	pub const DEFAULT_TOKEN_SAFETY_MARGIN: Duration = Duration::seconds(60);

	/// Creates a new builder with no explicit values.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Builds a config entirely from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::builder().resolve(&ProcessEnv)
	}

	/// Joins an API path onto the base URL, keeping the version prefix.
	pub fn endpoint(&self, path: &'static str) -> Result<Url, ConfigError> {
		let joined = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));

		Url::parse(&joined).map_err(|source| ConfigError::InvalidEndpoint { path, source })
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	client_id: Option<String>,
	client_secret: Option<Secret>,
	base_url: Option<String>,
	timeout: Option<StdDuration>,
	connect_timeout: Option<StdDuration>,
	token_safety_margin: Option<Duration>,
}
impl ClientConfigBuilder {
	/// Sets the client identifier, overriding `TINK_CLIENT_ID`.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret, overriding `TINK_CLIENT_SECRET`.
	pub fn client_secret(mut self, client_secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the API host, overriding `TINK_BASE_URL` and the production default.
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Sets the total per-request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the connect timeout.
	pub fn connect_timeout(mut self, timeout: StdDuration) -> Self {
		self.connect_timeout = Some(timeout);

		self
	}

	/// Sets the token safety margin (defaults to 60 seconds).
	pub fn token_safety_margin(mut self, margin: Duration) -> Self {
		self.token_safety_margin = Some(margin);

		self
	}

	/// Builds the config from explicit values only.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		self.resolve(&NoEnv)
	}

	/// Builds the config, filling missing credentials and host from `env`.
	///
	/// Empty strings count as missing on both sides.
	pub fn resolve(self, env: &impl EnvSource) -> Result<ClientConfig, ConfigError> {
		let lookup = |key: &str| env.var(key).filter(|value| !value.trim().is_empty());
		let client_id = self
			.client_id
			.filter(|value| !value.trim().is_empty())
			.or_else(|| lookup(CLIENT_ID_ENV))
			.ok_or(ConfigError::MissingCredential { field: "client_id", env: CLIENT_ID_ENV })?;
		let client_secret = self
			.client_secret
			.filter(|value| !value.is_blank())
			.or_else(|| lookup(CLIENT_SECRET_ENV).map(Secret::new))
			.ok_or(ConfigError::MissingCredential {
				field: "client_secret",
				env: CLIENT_SECRET_ENV,
			})?;
		let raw_base = self
			.base_url
			.or_else(|| lookup(BASE_URL_ENV))
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
		let base_url = parse_base_url(raw_base)?;
		let timeout = positive(self.timeout, ClientConfig::DEFAULT_TIMEOUT, "timeout")?;
		let connect_timeout =
			positive(self.connect_timeout, ClientConfig::DEFAULT_CONNECT_TIMEOUT, "connect_timeout")?;
		let token_safety_margin =
			self.token_safety_margin.unwrap_or(ClientConfig::DEFAULT_TOKEN_SAFETY_MARGIN);

		if token_safety_margin.is_negative() {
			return Err(ConfigError::InvalidDuration {
				field: "token_safety_margin",
				requirement: "zero or positive",
			});
		}

		Ok(ClientConfig {
			credentials: Credentials { client_id, client_secret },
			base_url,
			timeout,
			connect_timeout,
			token_safety_margin,
		})
	}
}

fn parse_base_url(raw: String) -> Result<Url, ConfigError> {
	let url = match Url::parse(raw.trim()) {
		Ok(url) => url,
		Err(source) => return Err(ConfigError::InvalidBaseUrl { value: raw, source }),
	};

	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(ConfigError::UnsupportedBaseUrl { url: url.to_string() });
	}

	Ok(url)
}

fn positive(
	value: Option<StdDuration>,
	default: StdDuration,
	field: &'static str,
) -> Result<StdDuration, ConfigError> {
	match value {
		Some(duration) if duration.is_zero() =>
			Err(ConfigError::InvalidDuration { field, requirement: "positive" }),
		Some(duration) => Ok(duration),
		None => Ok(default),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn env(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
		pairs.iter().copied().collect()
	}

	#[test]
	fn explicit_values_override_environment() {
		let env = env(&[(CLIENT_ID_ENV, "env-id"), (CLIENT_SECRET_ENV, "env-secret")]);
		let config = ClientConfig::builder()
			.client_id("explicit-id")
			.resolve(&env)
			.expect("Config should resolve with mixed sources.");

		assert_eq!(config.credentials.client_id, "explicit-id");
		assert_eq!(config.credentials.client_secret.expose(), "env-secret");
		assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
		assert_eq!(config.timeout, ClientConfig::DEFAULT_TIMEOUT);
		assert_eq!(config.token_safety_margin, ClientConfig::DEFAULT_TOKEN_SAFETY_MARGIN);
	}

	#[test]
	fn missing_credentials_fail_construction() {
		let err = ClientConfig::builder()
			.resolve(&env(&[]))
			.expect_err("Config without credentials must fail.");

		assert!(matches!(err, ConfigError::MissingCredential { field: "client_id", .. }));

		let err = ClientConfig::builder()
			.client_id("id")
			.resolve(&env(&[(CLIENT_SECRET_ENV, "  ")]))
			.expect_err("Blank secrets count as missing.");

		assert!(matches!(err, ConfigError::MissingCredential { env: CLIENT_SECRET_ENV, .. }));
	}

	#[test]
	fn endpoints_keep_the_version_prefix() {
		let config = ClientConfig::builder()
			.client_id("id")
			.client_secret("secret")
			.base_url("https://api.tink.test/api/v1/")
			.build()
			.expect("Config should build.");
		let token = config.endpoint("/oauth/token").expect("Token endpoint should join.");

		assert_eq!(token.as_str(), "https://api.tink.test/api/v1/oauth/token");
	}

	#[test]
	fn invalid_settings_are_rejected() {
		let base = || ClientConfig::builder().client_id("id").client_secret("secret");

		assert!(matches!(
			base().base_url("not a url").build(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
		assert!(matches!(
			base().base_url("mailto:ops@example.com").build(),
			Err(ConfigError::UnsupportedBaseUrl { .. })
		));
		assert!(matches!(
			base().timeout(StdDuration::ZERO).build(),
			Err(ConfigError::InvalidDuration { field: "timeout", .. })
		));
		assert!(matches!(
			base().token_safety_margin(Duration::seconds(-1)).build(),
			Err(ConfigError::InvalidDuration { field: "token_safety_margin", .. })
		));
	}

	#[test]
	fn credentials_debug_redacts_secret() {
		let credentials = Credentials::new("id", "hunter2");

		assert!(!format!("{credentials:?}").contains("hunter2"));
	}
}
