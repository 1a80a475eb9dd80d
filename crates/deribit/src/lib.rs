//! deribit - Async client for the Deribit trading API
//!
//! This library wraps Deribit's JSON-RPC over HTTP interface. All calls go
//! through a [`DeribitClient`], which owns the credentials, caches the
//! access token and re-authenticates when the token expires.
//!
//! Results are returned as parsed JSON ([`serde_json::Value`]).
//!
//! # Example
//!
//! ```no_run
//! use deribit::{ClientConfig, Credentials, DeribitClient, Environment, Order};
//!
//! # async fn example() -> Result<(), deribit::Error> {
//! let config = ClientConfig::new(Environment::Test)
//!     .with_credentials(Credentials::new("client-id", "client-secret"))
//!     .simulated(false);
//! let client = DeribitClient::new(config)?;
//!
//! let summary = client.get_account_summary("BTC").await?;
//! println!("equity: {}", summary["equity"]);
//!
//! let order = Order::new("BTC-PERPETUAL", 10.0).with_label("example");
//! let placed = client.order(&order).await?;
//! println!("{}", placed);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod rpc;
pub mod types;

// Re-export primary types at crate root for convenience
pub use api::{Order, OrderType, Side};
pub use auth::{Access, Credentials, Scope, SessionToken};
pub use client::{ClientConfig, Clock, DeribitClient, ManualClock, SystemClock};
pub use error::{AuthError, Error, InvalidInputError, NetworkError, RequestError};
pub use rpc::Method;
pub use types::{ApiUrl, Environment, InstrumentKind, OptionType};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
