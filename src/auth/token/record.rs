//! Bearer token state, lifecycle helpers, and builder.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::Secret},
};

/// Current lifecycle status for an access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token can be attached to requests.
	Valid,
	/// Token reached its margin-adjusted expiry instant.
	Expired,
}

/// Errors produced by [`AccessTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AccessTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no lifetime was configured.
	#[error("Token lifetime must be supplied via expires_in.")]
	MissingExpiry,
	/// Issued when the lifetime is zero or negative.
	#[error("Token lifetime must be positive.")]
	NonPositiveLifetime,
	/// Issued when the expiry instant cannot be represented.
	#[error("Token expiry is out of range.")]
	ExpiryOutOfRange,
}

/// Issued bearer token plus the instant after which it must not be used.
///
/// `expires_at` is always `issued_at + expires_in - safety_margin`, where the margin is
/// clamped to at most half the lifetime so short-lived tokens remain usable.
#[derive(Clone)]
pub struct AccessToken {
	/// Bearer secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Token type reported by the provider (normally `bearer`).
	pub token_type: String,
	/// Scopes granted to this token.
	pub scope: ScopeSet,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Lifetime reported by the provider.
	pub expires_in: Duration,
	/// Margin-adjusted expiry instant.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Returns a builder for the provided scope set.
	pub fn builder(scope: ScopeSet) -> AccessTokenBuilder {
		AccessTokenBuilder::new(scope)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.expires_at { TokenStatus::Valid } else { TokenStatus::Expired }
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token may be used at the provided instant.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Valid)
	}

	/// Returns `true` if the token may be used now.
	pub fn is_valid(&self) -> bool {
		matches!(self.status(), TokenStatus::Valid)
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status(), TokenStatus::Expired)
	}

	/// Time left before the token expires, floored at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}

	/// Returns `true` if the token expires within `window` of the provided instant.
	pub fn is_expiring_within(&self, window: Duration, instant: OffsetDateTime) -> bool {
		self.remaining_at(instant) <= window
	}

	/// Returns `true` if the token carries the scope.
	pub fn has_scope(&self, scope: &str) -> bool {
		self.scope.contains(scope)
	}

	/// Returns `true` if the token carries every scope in `required`.
	pub fn has_all_scopes(&self, required: &ScopeSet) -> bool {
		self.scope.is_superset_of(required)
	}

	/// Returns `true` if the token carries at least one scope in `required`.
	pub fn has_any_scope(&self, required: &ScopeSet) -> bool {
		self.scope.intersects(required)
	}

	/// `Authorization` header value, e.g. `Bearer abc`.
	pub fn authorization_value(&self) -> String {
		let mut chars = self.token_type.chars();
		let scheme: String = match chars.next() {
			Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
			None => String::from("Bearer"),
		};

		format!("{scheme} {}", self.access_token.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_in", &self.expires_in)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`AccessToken`].
#[derive(Clone, Debug)]
pub struct AccessTokenBuilder {
	scope: ScopeSet,
	access_token: Option<Secret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	safety_margin: Duration,
}
impl AccessTokenBuilder {
	fn new(scope: ScopeSet) -> Self {
		Self {
			scope,
			access_token: None,
			token_type: None,
			issued_at: None,
			expires_in: None,
			safety_margin: Duration::ZERO,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Sets the token type; defaults to `bearer`.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Convenience helper that stamps `issued_at` with the current clock.
	pub fn issued_now(self) -> Self {
		self.issued_at(OffsetDateTime::now_utc())
	}

	/// Sets the provider-reported lifetime.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Sets the margin subtracted from the lifetime; negative values count as zero.
	pub fn safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Consumes the builder and produces an [`AccessToken`].
	pub fn build(self) -> Result<AccessToken, AccessTokenBuilderError> {
		let access_token = self.access_token.ok_or(AccessTokenBuilderError::MissingAccessToken)?;
		let expires_in = self.expires_in.ok_or(AccessTokenBuilderError::MissingExpiry)?;

		if !expires_in.is_positive() {
			return Err(AccessTokenBuilderError::NonPositiveLifetime);
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let margin = self.safety_margin.min(expires_in / 2);
		let expires_at = issued_at
			.checked_add(expires_in - margin)
			.ok_or(AccessTokenBuilderError::ExpiryOutOfRange)?;

		Ok(AccessToken {
			access_token,
			token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
			scope: self.scope,
			issued_at,
			expires_in,
			expires_at,
		})
	}
}
