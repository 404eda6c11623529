// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	client::TinkClient,
	model::{CreateUserRequest, CreateUserResponse, User, UserDetails},
	obs::{self, OperationKind},
};

impl TinkClient {
	/// Creates a Tink user with the app token.
	///
	/// `market` must be two uppercase letters and `locale` a `language_REGION` pair; both are
	/// checked before any request is made. Tink does not echo market and locale back, so the
	/// returned [`User`] carries the submitted values.
	pub async fn create_user(
		&self,
		market: &str,
		locale: &str,
		external_user_id: Option<&str>,
	) -> Result<User> {
		const KIND: OperationKind = OperationKind::CreateUser;

		obs::observe(KIND, "create_user", async {
			let request = CreateUserRequest::parse(market, locale, external_user_id)?;
			let response = self
				.send_with_app_token(KIND, &ScopeSet::user_creation(), |client| {
					client.post(self.endpoints().create_user.clone()).json(&request)
				})
				.await?;
			let created = response.decode::<CreateUserResponse>()?;

			Ok(created.into_user(request))
		})
		.await
	}

	/// Fetches the user that `user_token` was issued for.
	pub async fn get_user(&self, user_token: &str) -> Result<UserDetails> {
		const KIND: OperationKind = OperationKind::GetUser;

		obs::observe(KIND, "get_user", async {
			self.send_with_user_token(KIND, user_token, |client| {
				client.get(self.endpoints().user.clone())
			})
			.await?
			.decode()
		})
		.await
	}

	/// Deletes the user that `user_token` was issued for, together with all of its data.
	pub async fn delete_user(&self, user_token: &str) -> Result<()> {
		const KIND: OperationKind = OperationKind::DeleteUser;

		obs::observe(KIND, "delete_user", async {
			self.send_with_user_token(KIND, user_token, |client| {
				client.post(self.endpoints().delete_user.clone())
			})
			.await?;

			Ok(())
		})
		.await
	}
}
