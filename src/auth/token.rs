//! Access token state and the redacted secret wrapper it carries.

pub mod record;
pub mod secret;
