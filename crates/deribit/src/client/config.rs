//! Client configuration.

use std::time::Duration;

use crate::auth::{Credentials, Scope};
use crate::types::{ApiUrl, Environment};

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default seconds before expiry at which a token is treated as expired.
pub const DEFAULT_EXPIRY_MARGIN_SECS: i64 = 5;

/// Construction parameters for [`DeribitClient`](crate::DeribitClient).
///
/// # Example
///
/// ```
/// use deribit::{ClientConfig, Credentials, Environment};
///
/// let config = ClientConfig::new(Environment::Test)
///     .with_credentials(Credentials::new("id", "secret"))
///     .simulated(false);
/// assert_eq!(config.api_url().rpc_url(), "https://test.deribit.com/api/v2");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deployment to talk to.
    pub environment: Environment,
    /// API key; required only for private endpoints.
    pub credentials: Option<Credentials>,
    /// When set, order placement is simulated locally and never sent.
    pub simulated: bool,
    /// Scope requested at authentication.
    pub scope: Option<Scope>,
    /// Replaces the environment's base URL (for local mock servers).
    pub base_url: Option<ApiUrl>,
    /// HTTP timeout for each request.
    pub timeout: Duration,
    /// Tokens are refreshed this long before they expire.
    pub expiry_margin: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            credentials: None,
            simulated: true,
            scope: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            expiry_margin: chrono::Duration::seconds(DEFAULT_EXPIRY_MARGIN_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn simulated(mut self, simulated: bool) -> Self {
        self.simulated = simulated;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_base_url(mut self, base_url: ApiUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_expiry_margin(mut self, margin: chrono::Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> ApiUrl {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.environment.base_url())
    }
}
