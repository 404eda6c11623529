//! User delegation: mint an authorization code for a user, exchange it for a user token, and
//! run user-scoped calls with it.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet, ScopeValidationError},
	client::TinkClient,
	error::ValidationError,
	model::{AuthorizationGrant, UserDetails, UserSelector},
	obs::{self, OperationKind},
};

impl TinkClient {
	/// Asks Tink for an authorization code that delegates `scope` on the selected user.
	///
	/// Uses the app token with the `authorization:grant` scope.
	pub async fn grant_user_access(
		&self,
		user: &UserSelector,
		scope: &ScopeSet,
	) -> Result<AuthorizationGrant> {
		const KIND: OperationKind = OperationKind::GrantUserAccess;

		obs::observe(KIND, "grant_user_access", async {
			if scope.is_empty() {
				return Err(ValidationError::Scope(ScopeValidationError::Empty).into());
			}

			let (field, value) = user.form_field();
			let scope = scope.normalized();

			self.send_with_app_token(KIND, &ScopeSet::user_creation(), |client| {
				client
					.post(self.endpoints().authorization_grant.clone())
					.form(&[(field, value), ("scope", scope.as_str())])
			})
			.await?
			.decode()
		})
		.await
	}

	/// Exchanges an authorization code for a user token.
	///
	/// The code comes from [`grant_user_access`](Self::grant_user_access) or from a Tink Link
	/// callback. User tokens are not cached.
	pub async fn exchange_user_code(&self, code: &str) -> Result<AccessToken> {
		const KIND: OperationKind = OperationKind::ExchangeUserCode;

		obs::observe(KIND, "exchange_user_code", async {
			let code = code.trim();

			if code.is_empty() {
				return Err(ValidationError::EmptyCredential { field: "code" }.into());
			}

			self.tokens()
				.endpoint()
				.authorization_code(code, self.config().token_safety_margin)
				.await
		})
		.await
	}

	/// Fetches a user by identifier through a short-lived `user:read` delegation.
	pub async fn get_user_by(&self, user: &UserSelector) -> Result<UserDetails> {
		let token = self.delegate(user, &ScopeSet::user_read()).await?;

		self.get_user(token.access_token.expose()).await
	}

	/// Deletes a user by identifier through a short-lived `user:delete` delegation.
	pub async fn delete_user_by(&self, user: &UserSelector) -> Result<()> {
		let token = self.delegate(user, &ScopeSet::user_delete()).await?;

		self.delete_user(token.access_token.expose()).await
	}

	async fn delegate(&self, user: &UserSelector, scope: &ScopeSet) -> Result<AccessToken> {
		let grant = self.grant_user_access(user, scope).await?;

		self.exchange_user_code(grant.code.expose()).await
	}
}
