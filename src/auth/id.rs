//! Strongly typed identifiers and request codes validated before they reach the wire.
//!
//! Market and locale checks are advisory: they catch obvious typos (`""`, `"spain"`,
//! `"es-ES"`) without trying to enumerate every market Tink supports.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:ident) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new value after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl PartialEq<str> for $name {
			fn eq(&self, other: &str) -> bool {
				self.0 == other
			}
		}
		impl PartialEq<&str> for $name {
			fn eq(&self, other: &&str) -> bool {
				self.0 == *other
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The value was empty or whitespace.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// Kind of value (user id, market, locale).
		kind: &'static str,
	},
	/// The value contains whitespace characters.
	#[error("{kind} contains whitespace.")]
	ContainsWhitespace {
		/// Kind of value (user id, market, locale).
		kind: &'static str,
	},
	/// The value exceeded the allowed character count.
	#[error("{kind} exceeds {max} characters.")]
	TooLong {
		/// Kind of value (user id, market, locale).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The value does not follow the expected shape.
	#[error("{kind} `{value}` is malformed; expected {expected}.")]
	Malformed {
		/// Kind of value (market, locale).
		kind: &'static str,
		/// Offending value.
		value: String,
		/// Shape description.
		expected: &'static str,
	},
}

def_id! { UserId, "Tink-assigned user identifier.", "User id", validate_token }
def_id! {
	ExternalUserId,
	"Caller-assigned user identifier stored by Tink alongside the user.",
	"External user id",
	validate_opaque
}
def_id! { Market, "Two-letter market code such as `ES` or `SE`.", "Market", validate_market }
def_id! { Locale, "Locale code such as `es_ES` or `sv_SE`.", "Locale", validate_locale }

fn validate_opaque(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.trim().is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn validate_token(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_opaque(kind, view)?;

	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}

	Ok(())
}

fn validate_market(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_token(kind, view)?;

	if view.len() != 2 || !view.bytes().all(|b| b.is_ascii_uppercase()) {
		return Err(malformed(kind, view, "two uppercase ASCII letters"));
	}

	Ok(())
}

fn validate_locale(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_token(kind, view)?;

	let shaped = match view.split_once('_') {
		Some((language, region)) =>
			language.len() == 2
				&& language.bytes().all(|b| b.is_ascii_lowercase())
				&& region.len() == 2
				&& region.bytes().all(|b| b.is_ascii_uppercase()),
		None => false,
	};

	if !shaped {
		return Err(malformed(kind, view, "a language_REGION pair such as es_ES"));
	}

	Ok(())
}

fn malformed(kind: &'static str, view: &str, expected: &'static str) -> IdentifierError {
	IdentifierError::Malformed { kind, value: view.to_owned(), expected }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn markets_and_locales_follow_iso_shapes() {
		assert_eq!(Market::new("ES").expect("ES should be a valid market."), "ES");
		assert_eq!(Locale::new("sv_SE").expect("sv_SE should be a valid locale."), "sv_SE");
		assert!(matches!(Market::new(""), Err(IdentifierError::Empty { kind: "Market" })));
		assert!(matches!(Market::new("es"), Err(IdentifierError::Malformed { .. })));
		assert!(matches!(Market::new("ESP"), Err(IdentifierError::Malformed { .. })));
		assert!(matches!(Locale::new("es-ES"), Err(IdentifierError::Malformed { .. })));
		assert!(matches!(Locale::new("ES_es"), Err(IdentifierError::Malformed { .. })));
		assert!(matches!(Locale::new(" es_ES"), Err(IdentifierError::ContainsWhitespace { .. })));
	}

	#[test]
	fn external_ids_allow_inner_spaces_but_not_blank_values() {
		ExternalUserId::new("customer 42").expect("Inner spaces are allowed in external ids.");

		assert!(ExternalUserId::new("   ").is_err());
		assert!(ExternalUserId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
		assert!(UserId::new("with space").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let user: UserId =
			serde_json::from_str("\"d9f134ee2eb44846a4e02990ecc8d32e\"").expect("User id should deserialize.");

		assert_eq!(user.as_ref(), "d9f134ee2eb44846a4e02990ecc8d32e");
		assert!(serde_json::from_str::<UserId>("\"\"").is_err());
		assert!(serde_json::from_str::<Market>("\"spain\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<UserId, u8> =
			HashMap::from_iter([(UserId::new("user-123").expect("User id should be valid."), 7_u8)]);

		assert_eq!(map.get("user-123"), Some(&7));
	}
}
