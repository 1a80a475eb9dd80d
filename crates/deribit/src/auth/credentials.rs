//! API credentials type.

use std::fmt;

/// Client credentials for Deribit authentication.
///
/// Holds the client id and client secret of an API key. Both are fixed
/// for the lifetime of a client.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use deribit::Credentials;
///
/// let creds = Credentials::new("my-client-id", "my-client-secret");
/// assert_eq!(creds.client_id(), "my-client-id");
/// ```
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Whether both parts are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}
