//! Session manager and request dispatcher.

mod clock;
mod config;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, DEFAULT_EXPIRY_MARGIN_SECS, DEFAULT_TIMEOUT};

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AccessToken, Credentials, SessionToken};
use crate::error::{AuthError, Error};
use crate::rpc::endpoints::{AUTH, AuthParams, AuthResult, is_private};
use crate::rpc::{Method, RpcClient};
use crate::types::{ApiUrl, Environment};

/// A client for one Deribit environment.
///
/// The client owns the credentials and the cached [`SessionToken`]. Every
/// private call goes through [`DeribitClient::ensure_valid_token`], so
/// callers never handle tokens themselves.
///
/// # Thread Safety
///
/// Clients are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks. The token cache sits behind an async mutex that is
/// held while re-authenticating, so concurrent callers that find an
/// expired token wait for one `public/auth` call instead of each sending
/// their own.
///
/// # Example
///
/// ```no_run
/// use deribit::{ClientConfig, Credentials, DeribitClient, Environment};
///
/// # async fn example() -> Result<(), deribit::Error> {
/// let config = ClientConfig::new(Environment::Test)
///     .with_credentials(Credentials::new("client-id", "client-secret"));
/// let client = DeribitClient::new(config)?;
///
/// let ticker = client.get_ticker("BTC-PERPETUAL").await?;
/// println!("{}", ticker["last_price"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DeribitClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    rpc: RpcClient,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<Arc<SessionToken>>>,
}

impl DeribitClient {
    /// Create a client using the system clock.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client that reads the time from `clock`.
    pub fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        if !config.credentials.as_ref().is_some_and(Credentials::is_complete) {
            warn!("client id or client secret not provided; private requests will fail");
        }

        let rpc = RpcClient::new(config.api_url(), config.timeout)?;
        debug!(env = %config.environment, base = %rpc.base(), "Client created");

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                rpc,
                clock,
                token: Mutex::new(None),
            }),
        })
    }

    pub fn environment(&self) -> Environment {
        self.inner.config.environment
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &ApiUrl {
        self.inner.rpc.base()
    }

    /// Whether orders are simulated instead of sent.
    pub fn is_simulated(&self) -> bool {
        self.inner.config.simulated
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.inner.config.credentials.as_ref()
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.clock.now()
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Exchange the client credentials for a new token.
    ///
    /// The new token replaces any cached one. On failure the cache is left
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if credentials are missing, rejected, or the
    /// auth endpoint is unreachable.
    #[instrument(skip(self), fields(env = %self.environment()))]
    pub async fn authenticate(&self) -> Result<Arc<SessionToken>, Error> {
        let mut slot = self.inner.token.lock().await;
        self.authenticate_locked(&mut slot).await
    }

    /// Return the cached token, authenticating first if it is missing or
    /// expired.
    pub async fn ensure_valid_token(&self) -> Result<Arc<SessionToken>, Error> {
        let mut slot = self.inner.token.lock().await;

        if let Some(token) = slot.as_ref()
            && !self.is_expired(token)
        {
            return Ok(Arc::clone(token));
        }

        debug!("No valid token cached");
        self.authenticate_locked(&mut slot).await
    }

    /// Exchange the cached refresh token for a new token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoRefreshToken`] if no token with a refresh
    /// token is cached.
    #[instrument(skip(self), fields(env = %self.environment()))]
    pub async fn refresh(&self) -> Result<Arc<SessionToken>, Error> {
        let mut slot = self.inner.token.lock().await;

        let refresh_token = slot
            .as_ref()
            .and_then(|token| token.refresh_token().cloned())
            .ok_or(AuthError::NoRefreshToken)?;

        info!("Refreshing token");
        let params = AuthParams {
            grant_type: "refresh_token",
            client_id: None,
            client_secret: None,
            refresh_token: Some(refresh_token.as_str()),
            scope: None,
        };

        *slot = None;
        let token = self.exchange(&params).await?;
        *slot = Some(Arc::clone(&token));
        Ok(token)
    }

    /// Drop the cached token.
    pub async fn invalidate(&self) {
        *self.inner.token.lock().await = None;
    }

    /// The cached token, if any, without validating it.
    pub async fn cached_token(&self) -> Option<Arc<SessionToken>> {
        self.inner.token.lock().await.clone()
    }

    async fn authenticate_locked(
        &self,
        slot: &mut Option<Arc<SessionToken>>,
    ) -> Result<Arc<SessionToken>, Error> {
        *slot = None;

        let credentials = self
            .inner
            .config
            .credentials
            .as_ref()
            .filter(|c| c.is_complete())
            .ok_or(AuthError::MissingCredentials)?;

        info!(client_id = credentials.client_id(), "Authenticating");

        let params = AuthParams {
            grant_type: "client_credentials",
            client_id: Some(credentials.client_id()),
            client_secret: Some(credentials.client_secret()),
            refresh_token: None,
            scope: self
                .inner
                .config
                .scope
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
        };

        let token = self.exchange(&params).await?;
        *slot = Some(Arc::clone(&token));
        Ok(token)
    }

    /// Send a `public/auth` request and turn the result into a token.
    async fn exchange(&self, params: &AuthParams<'_>) -> Result<Arc<SessionToken>, Error> {
        let params = serde_json::to_value(params)?;
        let issued_at = self.now();

        let result = self
            .inner
            .rpc
            .send(AUTH, Method::Post, &params, None)
            .await
            .map_err(|err| match err {
                Error::Request(err) => Error::Auth(AuthError::Rejected(err)),
                Error::Network(err) => Error::Auth(AuthError::Unavailable(err)),
                other => other,
            })?;

        let auth: AuthResult = serde_json::from_value(result)?;
        let token = SessionToken::issued(
            auth.access_token,
            auth.refresh_token,
            issued_at,
            auth.expires_in,
            auth.scope,
        )?;

        debug!(expires_at = %token.expires_at(), scope = token.scope(), "Token issued");
        Ok(Arc::new(token))
    }

    /// Re-authenticate after `rejected` was refused by the server.
    ///
    /// Another caller may already have replaced the rejected token; that
    /// replacement is used as-is.
    async fn reauthenticate(
        &self,
        rejected: &Arc<SessionToken>,
    ) -> Result<Arc<SessionToken>, Error> {
        let mut slot = self.inner.token.lock().await;

        if let Some(current) = slot.as_ref()
            && !Arc::ptr_eq(current, rejected)
            && !self.is_expired(current)
        {
            return Ok(Arc::clone(current));
        }

        self.authenticate_locked(&mut slot).await
    }

    fn is_expired(&self, token: &SessionToken) -> bool {
        token.is_expired(self.now(), self.inner.config.expiry_margin)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Perform one API call and return its `result`.
    ///
    /// When `authenticated` is set a valid token is attached. If the server
    /// rejects that token, the client re-authenticates once and resends;
    /// a second rejection is returned to the caller.
    ///
    /// # Errors
    ///
    /// - [`Error::Request`] with the vendor status, code and message when
    ///   the server answers with an error
    /// - [`Error::Network`] on transport failures
    /// - [`Error::Auth`] if a token cannot be obtained
    #[instrument(skip(self, params), fields(env = %self.environment()))]
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        params: &Value,
        authenticated: bool,
    ) -> Result<Value, Error> {
        if !authenticated {
            return self.inner.rpc.send(endpoint, method, params, None).await;
        }

        let token = self.ensure_valid_token().await?;
        match self
            .inner
            .rpc
            .send(endpoint, method, params, Some(token.access_token()))
            .await
        {
            Err(Error::Request(err)) if err.is_unauthorized() => {
                warn!(status = err.status, code = ?err.code, "Token rejected, re-authenticating");
                let token = self.reauthenticate(&token).await?;
                self.inner
                    .rpc
                    .send(endpoint, method, params, Some(token.access_token()))
                    .await
            }
            other => other,
        }
    }

    /// Build the request [`call`](Self::call) would send, without sending it.
    ///
    /// Useful to inspect the URL, headers and body a call produces.
    pub fn build_request(
        &self,
        endpoint: &str,
        method: Method,
        params: &Value,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Request, Error> {
        self.inner.rpc.build_request(endpoint, method, params, token)
    }

    /// POST a JSON-RPC call, authenticating when the endpoint is private.
    pub async fn request(&self, endpoint: &str, params: Value) -> Result<Value, Error> {
        self.call(endpoint, Method::Post, &params, is_private(endpoint))
            .await
    }
}

impl std::fmt::Debug for DeribitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeribitClient")
            .field("environment", &self.inner.config.environment)
            .field("base", self.inner.rpc.base())
            .field("simulated", &self.inner.config.simulated)
            .field("credentials", &self.inner.config.credentials)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
