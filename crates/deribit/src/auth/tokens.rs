//! Token types for Deribit authentication.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::error::Error;

/// An access token for authenticated requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens without the client secret.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// A token issued by `public/auth`, together with its expiry and scope.
///
/// A session token is never mutated. Refreshing produces a new value
/// that replaces the cached one.
#[derive(Debug, Clone)]
pub struct SessionToken {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    expires_at: DateTime<Utc>,
    scope: String,
}

impl SessionToken {
    /// Build a token issued at `issued_at` that lives for `expires_in` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `expires_in` is not positive or the
    /// resulting expiry is not a representable time.
    pub(crate) fn issued(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        issued_at: DateTime<Utc>,
        expires_in: i64,
        scope: impl Into<String>,
    ) -> Result<Self, Error> {
        let expires_at = Some(expires_in)
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| Error::Decode {
                message: format!("token lifetime {}s out of range", expires_in),
            })?;

        Ok(Self {
            access_token: AccessToken::new(access_token),
            refresh_token: refresh_token.map(RefreshToken::new),
            expires_at,
            scope: scope.into(),
        })
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The scope granted by the server.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Whether the token must not be used at `now`.
    ///
    /// `margin` treats a token as expired slightly before its deadline so
    /// it cannot lapse while a request is in flight.
    pub fn is_expired(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now.checked_add_signed(margin)
            .is_none_or(|deadline| deadline >= self.expires_at)
    }
}
