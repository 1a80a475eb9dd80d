//! Authentication types.
//!
//! Credentials are exchanged for a [`SessionToken`] by the client. The
//! client caches that token and attaches it to private requests.

mod credentials;
mod scope;
mod tokens;

pub use credentials::Credentials;
pub use scope::{Access, Scope};
pub use tokens::{AccessToken, RefreshToken, SessionToken};
