//! API base URL and environment selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Production host.
pub const PRODUCTION_URL: &str = "https://www.deribit.com";

/// Test (testnet) host.
pub const TEST_URL: &str = "https://test.deribit.com";

/// Path of the v2 API below the host.
pub const API_PATH: &str = "/api/v2";

/// Deribit deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    #[default]
    #[serde(rename = "prod", alias = "production")]
    Production,
}

impl Environment {
    /// Returns the base URL of this environment.
    pub fn base_url(self) -> ApiUrl {
        let raw = match self {
            Environment::Test => TEST_URL,
            Environment::Production => PRODUCTION_URL,
        };
        ApiUrl(Url::parse(raw).expect("built-in URL is valid"))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Production => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "test" | "testnet" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(InvalidInputError::Environment {
                value: s.to_string(),
            }
            .into()),
        }
    }
}

/// A validated API base URL.
///
/// This type ensures the URL is absolute and uses HTTPS (or HTTP for
/// localhost), and builds endpoint URLs below [`API_PATH`].
///
/// # Example
///
/// ```
/// use deribit::ApiUrl;
///
/// let url = ApiUrl::new("https://test.deribit.com").unwrap();
/// assert_eq!(url.rpc_url(), "https://test.deribit.com/api/v2");
/// assert_eq!(url.endpoint_url("public/ticker"),
///            "https://test.deribit.com/api/v2/public/ticker");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;
        Ok(Self(url))
    }

    /// URL that receives JSON-RPC POST envelopes.
    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.base(), API_PATH)
    }

    /// URL of a single endpoint, used for GET requests.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}/{}", self.base(), API_PATH, endpoint.trim_start_matches('/'))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn base(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::BaseUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");
        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.query().is_some() {
            return Err(invalid("must not carry a query string"));
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<Environment> for ApiUrl {
    fn from(env: Environment) -> Self {
        env.base_url()
    }
}
