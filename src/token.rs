//! App token cache with single-flight issuance.
//!
//! [`TokenManager`] owns the only piece of shared mutable state in the client: the current
//! client-credentials token. A single async mutex guards it and stays locked while a new token
//! is requested, so callers that arrive during issuance wait for that request instead of
//! starting their own.

mod metrics;

pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	oauth::TokenEndpoint,
	obs::{self, CacheEvent, OperationKind},
};

/// In-memory cache for the app-level bearer token.
#[derive(Debug)]
pub struct TokenManager {
	endpoint: TokenEndpoint,
	safety_margin: Duration,
	state: AsyncMutex<Option<AccessToken>>,
	metrics: CacheMetrics,
}
impl TokenManager {
	/// Creates an empty cache that issues tokens through `endpoint`.
	pub fn new(endpoint: TokenEndpoint, safety_margin: Duration) -> Self {
		Self { endpoint, safety_margin, state: AsyncMutex::new(None), metrics: CacheMetrics::default() }
	}

	/// Returns a valid token carrying every scope in `required`.
	///
	/// The cached token is reused while it is unexpired and covers `required`. Otherwise one
	/// client-credentials request is made; when the cached token is still valid but lacks scopes,
	/// the request asks for the union of both sets. Failures leave the previous state untouched
	/// and are not retried.
	pub async fn get_token(&self, required: &ScopeSet) -> Result<AccessToken> {
		let mut state = self.state.lock().await;
		let now = OffsetDateTime::now_utc();
		let scope = match state.as_ref() {
			Some(current) if current.is_valid_at(now) && current.has_all_scopes(required) => {
				self.metrics.record_hit();
				obs::record_cache_event(CacheEvent::Hit);

				return Ok(current.clone());
			},
			Some(current) if current.is_valid_at(now) => current.scope.union(required),
			_ => required.clone(),
		};

		self.metrics.record_miss();
		obs::record_cache_event(CacheEvent::Miss);

		let issued = obs::observe(
			OperationKind::IssueAppToken,
			"token_manager.get_token",
			self.endpoint.client_credentials(&scope, self.safety_margin),
		)
		.await;

		match issued {
			Ok(token) => {
				*state = Some(token.clone());

				Ok(token)
			},
			Err(err) => {
				self.metrics.record_failure();

				Err(err)
			},
		}
	}

	/// Drops the cached token so the next [`get_token`](Self::get_token) issues a new one.
	///
	/// Returns `true` when a token was cached.
	pub async fn invalidate(&self) -> bool {
		let dropped = self.state.lock().await.take().is_some();

		if dropped {
			self.metrics.record_invalidation();
			obs::record_cache_event(CacheEvent::Invalidated);
		}

		dropped
	}

	/// Drops the cached token only while it is still `rejected`.
	///
	/// A request that fails with a token issued before the current one must not evict the newer
	/// token. Returns `true` when the cache was cleared.
	pub async fn invalidate_if(&self, rejected: &AccessToken) -> bool {
		let mut state = self.state.lock().await;
		let dropped = match state.as_ref() {
			Some(current) if current.access_token == rejected.access_token => state.take().is_some(),
			_ => false,
		};

		if dropped {
			self.metrics.record_invalidation();
			obs::record_cache_event(CacheEvent::Invalidated);
		}

		dropped
	}

	/// Snapshot of the cached token, expired or not.
	pub async fn cached(&self) -> Option<AccessToken> {
		self.state.lock().await.clone()
	}

	/// Cache counters.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Token endpoint used for issuance.
	pub fn endpoint(&self) -> &TokenEndpoint {
		&self.endpoint
	}

	/// Margin subtracted from each issued token's lifetime.
	pub fn safety_margin(&self) -> Duration {
		self.safety_margin
	}
}
