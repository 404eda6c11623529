//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit spans named `tink_finance.operation` with the
//!   `operation` and `stage` fields, plus debug events for token cache hits and misses.
//! - Enable `metrics` to increment `tink_finance_operation_total` for every
//!   attempt/success/failure (labeled by `operation` + `outcome`) and
//!   `tink_finance_token_cache_total` for every cache event (labeled by `event`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// App token issuance via the client-credentials grant.
	IssueAppToken,
	/// User token issuance via the authorization-code grant.
	ExchangeUserCode,
	/// `POST /user/create`.
	CreateUser,
	/// `GET /user`.
	GetUser,
	/// `POST /user/delete`.
	DeleteUser,
	/// `POST /oauth/authorization-grant`.
	GrantUserAccess,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::IssueAppToken => "client_credentials",
			OperationKind::ExchangeUserCode => "authorization_code",
			OperationKind::CreateUser => "create_user",
			OperationKind::GetUser => "get_user",
			OperationKind::DeleteUser => "delete_user",
			OperationKind::GrantUserAccess => "grant_user_access",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Token cache events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheEvent {
	/// A cached token satisfied the request.
	Hit,
	/// No usable token was cached; a new one is requested.
	Miss,
	/// The cached token was dropped.
	Invalidated,
}
impl CacheEvent {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheEvent::Hit => "hit",
			CacheEvent::Miss => "miss",
			CacheEvent::Invalidated => "invalidated",
		}
	}
}
impl Display for CacheEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt plus outcome.
pub(crate) async fn observe<T, Fut>(kind: OperationKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_outcome(kind, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(kind, Outcome::Success),
		Err(err) => {
			span.failed(err);
			record_outcome(kind, Outcome::Failure);
		},
	}

	result
}
