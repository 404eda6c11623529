//! Scope modeling for Tink's comma-delimited OAuth scopes.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Scopes needed by app-token calls that create users or grant access to them.
pub const USER_CREATION_SCOPES: [&str; 2] = ["authorization:grant", "user:create"];
/// Scopes delegated to a user token that reads the user record.
pub const USER_READ_SCOPES: [&str; 1] = ["user:read"];
/// Scopes delegated to a user token that deletes the user.
pub const USER_DELETE_SCOPES: [&str; 1] = ["user:delete"];

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// Scopes cannot contain the comma delimiter.
	#[error("Scope contains the `,` delimiter: {scope}.")]
	ContainsDelimiter {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized set of Tink scopes.
///
/// Scopes are deduplicated and sorted so equality, ordering, and hashing stay stable.
/// Tink joins scopes with commas on the wire; [`normalized`](Self::normalized) renders that
/// form and [`FromStr`] accepts it back (whitespace separators are tolerated too).
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
}
impl ScopeSet {
	/// Wire delimiter used by Tink.
	pub const DELIMITER: char = ',';

	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { scopes: normalize(scopes)? })
	}

	/// Scopes required by user creation and authorization grants.
	pub fn user_creation() -> Self {
		Self::from_static(&USER_CREATION_SCOPES)
	}

	/// Scopes delegated for reading a user.
	pub fn user_read() -> Self {
		Self::from_static(&USER_READ_SCOPES)
	}

	/// Scopes delegated for deleting a user.
	pub fn user_delete() -> Self {
		Self::from_static(&USER_DELETE_SCOPES)
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Returns true if every scope in `other` is also in `self`.
	pub fn is_superset_of(&self, other: &ScopeSet) -> bool {
		other.iter().all(|scope| self.contains(scope))
	}

	/// Returns true if the two sets share at least one scope.
	pub fn intersects(&self, other: &ScopeSet) -> bool {
		other.iter().any(|scope| self.contains(scope))
	}

	/// Returns the union of both sets.
	pub fn union(&self, other: &ScopeSet) -> ScopeSet {
		let merged = self.iter().chain(other.iter()).map(str::to_owned).collect::<BTreeSet<_>>();

		Self { scopes: Arc::from(merged.into_iter().collect::<Vec<_>>()) }
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Returns the comma-delimited wire representation.
	pub fn normalized(&self) -> String {
		self.scopes.join(",")
	}

	/// Parses provider-returned scope fragments, each of which may itself be comma-delimited.
	pub(crate) fn from_fragments<'a, I>(fragments: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = &'a str>,
	{
		Self::new(fragments.into_iter().flat_map(split_scopes))
	}

	fn from_static(scopes: &[&str]) -> Self {
		let mut owned = scopes.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();

		owned.sort();
		owned.dedup();

		Self { scopes: Arc::from(owned) }
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.scopes).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}

impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}

		let parts = split_scopes(s).collect::<Vec<_>>();

		if parts.is_empty() {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(parts)
	}
}

fn split_scopes(raw: &str) -> impl Iterator<Item = &str> {
	raw.split(|c: char| c == ScopeSet::DELIMITER || c.is_whitespace()).filter(|s| !s.is_empty())
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}
		if owned.contains(ScopeSet::DELIMITER) {
			return Err(ScopeValidationError::ContainsDelimiter { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}
