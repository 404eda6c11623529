//! Request and response models for the user endpoints and Tink Link callbacks.

pub mod callback;
pub mod grant;
pub mod user;

pub use callback::*;
pub use grant::*;
pub use user::*;
