//! HTTP client that speaks Deribit's JSON-RPC dialect.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::auth::AccessToken;
use crate::error::{Error, RequestError};
use crate::types::ApiUrl;

use super::endpoints::{JsonRpcError, JsonRpcRequest};

/// HTTP verb used for a call.
///
/// `Post` sends a JSON-RPC envelope to the API root. `Get` addresses the
/// endpoint path directly and sends parameters as a query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Low-level transport. Knows nothing about tokens beyond attaching one.
pub(crate) struct RpcClient {
    http: reqwest::Client,
    base: ApiUrl,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(base: ApiUrl, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("deribit-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Build the outbound request without sending it.
    pub fn build_request(
        &self,
        endpoint: &str,
        method: Method,
        params: &Value,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Request, Error> {
        let endpoint = endpoint.trim_start_matches('/');

        let builder = match method {
            Method::Post => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let envelope = JsonRpcRequest::new(id, endpoint, params);
                self.http.post(self.base.rpc_url()).json(&envelope)
            }
            Method::Get => self
                .http
                .get(self.base.endpoint_url(endpoint))
                .query(&query_pairs(params)),
        };

        let builder = match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        };

        Ok(builder.build()?)
    }

    /// Build, send, and decode a call.
    #[instrument(skip(self, params, token), fields(base = %self.base, authenticated = token.is_some()))]
    pub async fn send(
        &self,
        endpoint: &str,
        method: Method,
        params: &Value,
        token: Option<&AccessToken>,
    ) -> Result<Value, Error> {
        let request = self.build_request(endpoint, method, params, token)?;
        debug!(endpoint, %method, "JSON-RPC call");

        let response = self.http.execute(request).await?;
        self.handle_response(response).await
    }

    /// Split a response into its `result` or a [`RequestError`].
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, Error> {
        let status = response.status();
        trace!(status = %status, "JSON-RPC response");

        let body = response.bytes().await?;
        let parsed: Option<Value> = serde_json::from_slice(&body).ok();

        match parsed {
            Some(Value::Object(mut map)) => {
                if let Some(error) = map.remove("error").filter(|e| !e.is_null()) {
                    return Err(error_from_payload(status.as_u16(), error).into());
                }
                if !status.is_success() {
                    return Err(RequestError::new(status.as_u16(), None, None, None).into());
                }
                map.remove("result").ok_or_else(|| Error::Decode {
                    message: "response carries neither result nor error".to_string(),
                })
            }
            _ if !status.is_success() => {
                Err(RequestError::new(status.as_u16(), None, None, None).into())
            }
            _ => Err(Error::Decode {
                message: format!("expected a JSON-RPC object, got {} bytes", body.len()),
            }),
        }
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("base", &self.base)
            .finish()
    }
}

fn error_from_payload(status: u16, error: Value) -> RequestError {
    match serde_json::from_value::<JsonRpcError>(error.clone()) {
        Ok(err) => RequestError::new(status, Some(err.code), err.message, err.data),
        // Not shaped like a JSON-RPC error; keep the raw payload.
        Err(_) => RequestError::new(status, None, None, Some(error)),
    }
}

/// Flatten a params object into query pairs.
///
/// Scalars are rendered as text; nested values are sent as JSON.
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Some(map) = params.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
