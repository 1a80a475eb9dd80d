//! JSON-RPC over HTTP transport.

mod client;
pub mod endpoints;

pub use client::Method;
pub(crate) use client::RpcClient;
