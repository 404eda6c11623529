//! User records, creation payloads, and the selector used by delegated calls.

// crates.io
use serde::{Deserializer, de::Error as _};
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{ExternalUserId, IdentifierError, Locale, Market, UserId},
	error::ValidationError,
};

/// User as returned by [`TinkClient::create_user`](crate::TinkClient::create_user).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
	/// Tink-assigned identifier.
	pub user_id: UserId,
	/// Market the user belongs to.
	pub market: Market,
	/// User locale.
	pub locale: Locale,
	/// Caller-assigned identifier, when one was supplied.
	pub external_user_id: Option<ExternalUserId>,
}

/// Payload for `POST /user/create`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateUserRequest {
	/// Market code.
	pub market: Market,
	/// Locale code.
	pub locale: Locale,
	/// Optional caller-assigned identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_user_id: Option<ExternalUserId>,
}
impl CreateUserRequest {
	/// Creates a payload from already validated values.
	pub fn new(market: Market, locale: Locale) -> Self {
		Self { market, locale, external_user_id: None }
	}

	/// Validates raw inputs and builds the payload.
	pub fn parse(
		market: &str,
		locale: &str,
		external_user_id: Option<&str>,
	) -> Result<Self, IdentifierError> {
		Ok(Self {
			market: Market::new(market)?,
			locale: Locale::new(locale)?,
			external_user_id: external_user_id.map(ExternalUserId::new).transpose()?,
		})
	}

	/// Attaches a caller-assigned identifier.
	pub fn external_user_id(mut self, external_user_id: ExternalUserId) -> Self {
		self.external_user_id = Some(external_user_id);

		self
	}
}

/// Body returned by `POST /user/create`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreateUserResponse {
	/// Tink-assigned identifier.
	pub user_id: UserId,
	/// Caller-assigned identifier echoed back by Tink.
	#[serde(default)]
	pub external_user_id: Option<ExternalUserId>,
}
impl CreateUserResponse {
	/// Combines the response with the submitted payload.
	///
	/// Tink does not echo market and locale, so they come from the request.
	pub fn into_user(self, request: CreateUserRequest) -> User {
		User {
			user_id: self.user_id,
			market: request.market,
			locale: request.locale,
			external_user_id: self.external_user_id.or(request.external_user_id),
		}
	}
}

/// Full user record returned by `GET /user`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
	/// Owning app identifier.
	pub app_id: String,
	/// Creation instant; Tink sends epoch milliseconds, older payloads an RFC 3339 string.
	#[serde(deserialize_with = "deserialize_created")]
	pub created: OffsetDateTime,
	/// Caller-assigned identifier.
	#[serde(default)]
	pub external_user_id: Option<ExternalUserId>,
	/// Feature flags enabled for the user.
	#[serde(default)]
	pub flags: Vec<String>,
	/// Tink-assigned identifier.
	pub id: UserId,
	/// National identification number, when known.
	#[serde(default)]
	pub national_id: Option<String>,
	/// Profile settings.
	pub profile: UserProfile,
	/// Legacy username.
	#[serde(default)]
	pub username: Option<String>,
}
impl From<UserDetails> for User {
	fn from(details: UserDetails) -> Self {
		User {
			user_id: details.id,
			market: details.profile.market,
			locale: details.profile.locale,
			external_user_id: details.external_user_id,
		}
	}
}

/// User profile nested in [`UserDetails`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// ISO 4217 currency code.
	pub currency: String,
	/// User locale.
	pub locale: Locale,
	/// Market the user belongs to.
	pub market: Market,
	/// Notification toggles.
	#[serde(default)]
	pub notification_settings: NotificationSettings,
	/// Day of month the budgeting period starts on.
	#[serde(default)]
	pub period_adjusted_day: Option<u8>,
	/// Budgeting period mode.
	#[serde(default)]
	pub period_mode: Option<String>,
	/// IANA time zone name.
	pub time_zone: String,
	/// Budgeting period settings.
	#[serde(default)]
	pub period_settings: Option<PeriodSettings>,
}

/// Notification toggles; absent entries are off.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
	/// Balance notifications.
	pub balance: bool,
	/// Budget notifications.
	pub budget: bool,
	/// Double charge notifications.
	pub double_charge: bool,
	/// E-invoice notifications.
	pub einvoices: bool,
	/// Fraud notifications.
	pub fraud: bool,
	/// Income notifications.
	pub income: bool,
	/// Large expense notifications.
	pub large_expense: bool,
	/// Left-to-spend notifications.
	pub left_to_spend: bool,
	/// Loan update notifications.
	pub loan_update: bool,
	/// Monthly summary notifications.
	pub summary_monthly: bool,
	/// Weekly summary notifications.
	pub summary_weekly: bool,
	/// Transaction notifications.
	pub transaction: bool,
	/// Unusual account notifications.
	pub unusual_account: bool,
	/// Unusual category notifications.
	pub unusual_category: bool,
}

/// Budgeting period settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSettings {
	/// Period mode, e.g. `MONTHLY_ADJUSTED`.
	pub mode: String,
	/// Adjusted period start day.
	pub adjusted_period_day: u8,
}

/// Identifies the user a delegated call acts on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UserSelector {
	/// Tink-assigned identifier.
	UserId(UserId),
	/// Caller-assigned identifier.
	ExternalUserId(ExternalUserId),
}
impl UserSelector {
	/// Builds a selector from optional raw values; exactly one must be present.
	///
	/// Blank strings count as absent.
	pub fn from_parts(
		user_id: Option<&str>,
		external_user_id: Option<&str>,
	) -> Result<Self, ValidationError> {
		fn present(value: Option<&str>) -> Option<&str> {
			value.filter(|value| !value.trim().is_empty())
		}

		match (present(user_id), present(external_user_id)) {
			(Some(user_id), None) => Ok(Self::UserId(UserId::new(user_id)?)),
			(None, Some(external)) => Ok(Self::ExternalUserId(ExternalUserId::new(external)?)),
			(Some(_), Some(_)) => Err(ValidationError::AmbiguousUser),
			(None, None) => Err(ValidationError::MissingUser),
		}
	}

	/// Form field name and value sent to the authorization-grant endpoint.
	pub fn form_field(&self) -> (&'static str, &str) {
		match self {
			Self::UserId(id) => ("user_id", id.as_ref()),
			Self::ExternalUserId(id) => ("external_user_id", id.as_ref()),
		}
	}
}
impl From<UserId> for UserSelector {
	fn from(value: UserId) -> Self {
		Self::UserId(value)
	}
}
impl From<ExternalUserId> for UserSelector {
	fn from(value: ExternalUserId) -> Self {
		Self::ExternalUserId(value)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
	Millis(i64),
	Text(String),
}

fn deserialize_created<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	match RawTimestamp::deserialize(deserializer)? {
		RawTimestamp::Millis(millis) =>
			OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
				.map_err(D::Error::custom),
		RawTimestamp::Text(text) => OffsetDateTime::parse(&text, &Rfc3339).map_err(D::Error::custom),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	fn details_json(created: serde_json::Value) -> serde_json::Value {
		json!({
			"appId": "app-1",
			"created": created,
			"externalUserId": "customer-42",
			"flags": ["TRANSFERS"],
			"id": "d9f134ee2eb44846a4e02990ecc8d32e",
			"nationalId": null,
			"profile": {
				"currency": "EUR",
				"locale": "es_ES",
				"market": "ES",
				"notificationSettings": { "balance": true, "fraud": true },
				"periodAdjustedDay": 25,
				"periodMode": "MONTHLY_ADJUSTED",
				"timeZone": "Europe/Madrid",
				"periodSettings": { "mode": "MONTHLY_ADJUSTED", "adjustedPeriodDay": 25 }
			},
			"username": null
		})
	}

	#[test]
	fn user_details_accept_epoch_millis_and_rfc3339() {
		let millis: UserDetails = serde_json::from_value(details_json(json!(1_735_689_600_000_i64)))
			.expect("Epoch millis should parse.");
		let text: UserDetails =
			serde_json::from_value(details_json(json!("2025-01-01T00:00:00Z")))
				.expect("RFC 3339 should parse.");

		assert_eq!(millis.created, macros::datetime!(2025-01-01 00:00 UTC));
		assert_eq!(millis, text);
		assert!(millis.profile.notification_settings.fraud);
		assert!(!millis.profile.notification_settings.budget);
		assert_eq!(millis.profile.period_settings.as_ref().map(|p| p.adjusted_period_day), Some(25));
	}

	#[test]
	fn user_details_project_onto_user() {
		let details: UserDetails = serde_json::from_value(details_json(json!(0)))
			.expect("Details fixture should parse.");
		let user = User::from(details);

		assert_eq!(user.user_id, "d9f134ee2eb44846a4e02990ecc8d32e");
		assert_eq!(user.market, "ES");
		assert_eq!(user.locale, "es_ES");
		assert_eq!(user.external_user_id.as_deref(), Some("customer-42"));
	}

	#[test]
	fn create_request_omits_absent_external_id() {
		let request = CreateUserRequest::parse("ES", "es_ES", None).expect("Inputs are valid.");

		assert_eq!(
			serde_json::to_value(&request).expect("Request should serialize."),
			json!({ "market": "ES", "locale": "es_ES" })
		);
		assert!(CreateUserRequest::parse("", "es_ES", None).is_err());
		assert!(CreateUserRequest::parse("ES", "es_ES", Some(" ")).is_err());
	}

	#[test]
	fn selector_requires_exactly_one_identifier() {
		assert!(matches!(UserSelector::from_parts(None, None), Err(ValidationError::MissingUser)));
		assert!(matches!(
			UserSelector::from_parts(Some("u"), Some("e")),
			Err(ValidationError::AmbiguousUser)
		));
		assert!(matches!(
			UserSelector::from_parts(Some(""), None),
			Err(ValidationError::MissingUser)
		));

		let selector =
			UserSelector::from_parts(None, Some("customer-42")).expect("One identifier is enough.");

		assert_eq!(selector.form_field(), ("external_user_id", "customer-42"));
	}
}
