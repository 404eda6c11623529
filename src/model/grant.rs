//! Authorization-grant response.

// self
use crate::{_prelude::*, auth::Secret};

/// Authorization code minted by `POST /oauth/authorization-grant`.
///
/// The code is single-use and short-lived; exchange it right away with
/// [`TinkClient::exchange_user_code`](crate::TinkClient::exchange_user_code).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthorizationGrant {
	/// Authorization code.
	pub code: Secret,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_code_is_redacted_in_debug() {
		let grant: AuthorizationGrant =
			serde_json::from_str(r#"{"code":"a1b2c3"}"#).expect("Grant fixture should parse.");

		assert_eq!(grant.code.expose(), "a1b2c3");
		assert!(!format!("{grant:?}").contains("a1b2c3"));
	}
}
