//! Endpoint names and JSON-RPC envelope types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Names
// ============================================================================

pub const AUTH: &str = "public/auth";
pub const GET_TIME: &str = "public/get_time";
pub const STATUS: &str = "public/status";
pub const TEST: &str = "public/test";

pub const GET_CURRENCIES: &str = "public/get_currencies";
pub const GET_CONTRACT_SIZE: &str = "public/get_contract_size";
pub const TICKER: &str = "public/ticker";
pub const GET_BOOK_SUMMARY_BY_CURRENCY: &str = "public/get_book_summary_by_currency";
pub const GET_BOOK_SUMMARY_BY_INSTRUMENT: &str = "public/get_book_summary_by_instrument";
pub const GET_INSTRUMENTS: &str = "public/get_instruments";
pub const GET_INSTRUMENT: &str = "public/get_instrument";
pub const GET_TRADINGVIEW_CHART_DATA: &str = "public/get_tradingview_chart_data";

pub const GET_ACCOUNT_SUMMARY: &str = "private/get_account_summary";
pub const GET_POSITIONS: &str = "private/get_positions";
pub const GET_TRANSACTION_LOG: &str = "private/get_transaction_log";
pub const GET_PORTFOLIO_MARGINS: &str = "private/get_portfolio_margins";
pub const GET_SUBACCOUNTS: &str = "private/get_subaccounts";
pub const LIST_API_KEYS: &str = "private/list_api_keys";

pub const BUY: &str = "private/buy";
pub const SELL: &str = "private/sell";
pub const CLOSE_POSITION: &str = "private/close_position";
pub const GET_MARGINS: &str = "private/get_margins";
pub const GET_OPEN_ORDERS: &str = "private/get_open_orders";
pub const GET_ORDER_STATE: &str = "private/get_order_state";
pub const GET_ORDER_STATE_BY_LABEL: &str = "private/get_order_state_by_label";
pub const GET_USER_TRADES_BY_ORDER: &str = "private/get_user_trades_by_order";
pub const CANCEL_BY_LABEL: &str = "private/cancel_by_label";
pub const CANCEL_ALL_BY_KIND_OR_TYPE: &str = "private/cancel_all_by_kind_or_type";

/// Whether calls to `endpoint` need a bearer token.
pub fn is_private(endpoint: &str) -> bool {
    endpoint.trim_start_matches('/').starts_with("private/")
}

// ============================================================================
// Envelopes
// ============================================================================

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a P,
}

impl<'a, P> JsonRpcRequest<'a, P> {
    pub fn new(id: u64, method: &'a str, params: &'a P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// ============================================================================
// Authentication
// ============================================================================

/// Parameters for `public/auth`.
#[derive(Serialize)]
pub struct AuthParams<'a> {
    pub grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Result of `public/auth`.
#[derive(Debug, Deserialize)]
pub struct AuthResult {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}
