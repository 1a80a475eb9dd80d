//! Mock server tests for the deribit library.
//!
//! These tests use wiremock to stand in for the Deribit API and exercise the
//! session handling and dispatch without network access or real credentials.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use deribit::error::{CODE_INVALID_CREDENTIALS, CODE_UNAUTHORIZED};
use deribit::{
    ApiUrl, AuthError, ClientConfig, Clock, Credentials, DeribitClient, Environment, Error,
    InstrumentKind, ManualClock, Method, Order,
};
use serde_json::{Value, json};
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START_MS: i64 = 1_704_067_200_000;

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.timestamp_millis_opt(START_MS).unwrap())
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(Environment::Test)
        .with_base_url(mock_api_url(server))
        .with_credentials(Credentials::new("client-id", "client-secret"))
}

fn client(server: &MockServer, clock: &ManualClock) -> DeribitClient {
    DeribitClient::with_clock(config(server), Arc::new(clock.clone())).unwrap()
}

fn live_client(server: &MockServer, clock: &ManualClock) -> DeribitClient {
    DeribitClient::with_clock(config(server).simulated(false), Arc::new(clock.clone())).unwrap()
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
        "usIn": 1, "usOut": 2, "usDiff": 1, "testnet": true
    }))
}

fn rpc_error(status: u16, code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message}
    }))
}

fn token(access: &str) -> Value {
    json!({
        "access_token": access,
        "expires_in": 900,
        "refresh_token": format!("{}-refresh", access),
        "scope": "connection mainaccount",
        "token_type": "bearer"
    })
}

fn rpc_method(name: &str) -> wiremock::matchers::BodyPartialJsonMatcher {
    body_partial_json(json!({"method": name}))
}

async fn mount_auth(server: &MockServer, access: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v2"))
        .and(rpc_method("public/auth"))
        .respond_with(rpc_result(token(access)))
        .expect(times)
        .mount(server)
        .await;
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_authenticate_sends_client_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "public/auth",
            "params": {
                "grant_type": "client_credentials",
                "client_id": "client-id",
                "client_secret": "client-secret"
            }
        })))
        .respond_with(rpc_result(token("tok")))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let session = client.authenticate().await.unwrap();

    assert_eq!(session.access_token().as_str(), "tok");
    assert_eq!(session.refresh_token().unwrap().as_str(), "tok-refresh");
    assert_eq!(session.scope(), "connection mainaccount");
    assert_eq!(session.expires_at(), clock.now() + Duration::seconds(900));
}

#[tokio::test]
async fn test_calls_before_expiry_reuse_token() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    let clock = clock();
    let client = client(&server, &clock);

    let first = client.ensure_valid_token().await.unwrap();
    clock.advance(Duration::seconds(600));
    let second = client.ensure_valid_token().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_private_calls_share_one_authentication() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(rpc_method("private/get_positions"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(rpc_result(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    let (a, b) = tokio::join!(
        client.get_positions("BTC", None),
        client.get_positions("ETH", Some(InstrumentKind::Future)),
    );
    a.unwrap();
    b.unwrap();
    client.get_positions("BTC", None).await.unwrap();
}

#[tokio::test]
async fn test_call_after_expiry_reauthenticates_once() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 2).await;

    let clock = clock();
    let client = client(&server, &clock);

    let first = client.ensure_valid_token().await.unwrap();
    clock.advance(Duration::seconds(900));
    let second = client.ensure_valid_token().await.unwrap();
    let third = client.ensure_valid_token().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
}

#[tokio::test]
async fn test_rejected_credentials_leave_no_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/auth"))
        .respond_with(rpc_error(400, CODE_INVALID_CREDENTIALS, "invalid_credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client.authenticate().await.unwrap_err();

    match err {
        Error::Auth(AuthError::Rejected(rejected)) => {
            assert_eq!(rejected.status, 400);
            assert_eq!(rejected.code, Some(CODE_INVALID_CREDENTIALS));
            assert_eq!(rejected.message.as_deref(), Some("invalid_credentials"));
        }
        other => panic!("expected a rejected auth error, got {:?}", other),
    }
    assert!(client.cached_token().await.is_none());
}

#[tokio::test]
async fn test_out_of_range_token_lifetime_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/auth"))
        .respond_with(rpc_result(json!({
            "access_token": "tok",
            "expires_in": i64::MAX,
            "refresh_token": "tok-refresh",
            "scope": "connection",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client.authenticate().await.unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert!(client.cached_token().await.is_none());
}

#[tokio::test]
async fn test_failed_reauthentication_clears_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/auth"))
        .respond_with(rpc_result(token("tok")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(rpc_method("public/auth"))
        .respond_with(rpc_error(400, CODE_INVALID_CREDENTIALS, "invalid_credentials"))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    client.ensure_valid_token().await.unwrap();
    assert!(client.authenticate().await.is_err());
    assert!(client.cached_token().await.is_none());
}

#[tokio::test]
async fn test_missing_credentials_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = ClientConfig::new(Environment::Test).with_base_url(mock_api_url(&server));
    let client = DeribitClient::new(config).unwrap();
    let err = client.get_account_summary("BTC").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::MissingCredentials)));
}

#[tokio::test]
async fn test_refresh_uses_refresh_token_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/auth",
            "params": {"grant_type": "refresh_token", "refresh_token": "tok-refresh"}
        })))
        .respond_with(rpc_result(token("tok2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/auth",
            "params": {"grant_type": "client_credentials"}
        })))
        .respond_with(rpc_result(token("tok")))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    let first = client.authenticate().await.unwrap();
    let refreshed = client.refresh().await.unwrap();

    assert_eq!(first.access_token().as_str(), "tok");
    assert_eq!(refreshed.access_token().as_str(), "tok2");
    let cached = client.cached_token().await.unwrap();
    assert!(Arc::ptr_eq(&cached, &refreshed));
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_unauthorized_call_reauthenticates_and_resends() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 2).await;

    Mock::given(method("POST"))
        .and(rpc_method("private/get_account_summary"))
        .respond_with(rpc_error(400, CODE_UNAUTHORIZED, "unauthorized"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(rpc_method("private/get_account_summary"))
        .and(body_partial_json(json!({"params": {"currency": "BTC", "extended": true}})))
        .respond_with(rpc_result(json!({"currency": "BTC", "equity": 1.5})))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let summary = client.get_account_summary("BTC").await.unwrap();

    assert_eq!(summary["equity"], 1.5);
}

#[tokio::test]
async fn test_second_unauthorized_rejection_propagates() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 2).await;

    Mock::given(method("POST"))
        .and(rpc_method("private/get_open_orders"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client.get_open_orders().await.unwrap_err();

    let request = err.as_request().expect("request error");
    assert_eq!(request.status, 401);
    assert!(request.is_unauthorized());
}

#[tokio::test]
async fn test_unknown_method_keeps_vendor_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/no_such_method"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 7,
            "error": {"code": -32601, "message": "Method not found", "data": {"method": "x"}}
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client
        .call("public/no_such_method", Method::Post, &json!({}), false)
        .await
        .unwrap_err();

    let request = err.as_request().expect("request error");
    assert_eq!(request.status, 400);
    assert_eq!(request.code, Some(-32601));
    assert_eq!(request.message.as_deref(), Some("Method not found"));
    assert_eq!(request.data, Some(json!({"method": "x"})));
}

#[tokio::test]
async fn test_bad_params_keep_vendor_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/ticker"))
        .respond_with(rpc_error(400, -32602, "Invalid params"))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client.get_ticker("NOPE").await.unwrap_err();

    let request = err.as_request().expect("request error");
    assert_eq!(request.code, Some(-32602));
    assert_eq!(request.message.as_deref(), Some("Invalid params"));
}

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client.get_time().await.unwrap_err();

    let request = err.as_request().expect("request error");
    assert_eq!(request.status, 502);
    assert_eq!(request.code, None);
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let err = client.get_time().await.unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new(Environment::Test)
        .with_base_url(ApiUrl::new(format!("http://127.0.0.1:{}", port)).unwrap())
        .with_credentials(Credentials::new("client-id", "client-secret"));
    let client = DeribitClient::new(config).unwrap();

    let err = client.get_time().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::Unavailable(_))));
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_get_currencies_uses_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/public/get_currencies"))
        .respond_with(rpc_result(json!([
            {"currency": "BTC", "currency_long": "Bitcoin"},
            {"currency": "ETH", "currency_long": "Ethereum"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    assert_eq!(client.currencies().await.unwrap(), vec!["BTC", "ETH"]);
}

#[tokio::test]
async fn test_mid_price_falls_back_to_mark() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/ticker"))
        .respond_with(rpc_result(json!({
            "instrument_name": "BTC-29MAR24-90000-C",
            "best_bid_price": 0.0,
            "best_ask_price": 0.0,
            "last_price": null,
            "mark_price": 0.0125
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    assert_eq!(client.mid_price("BTC-29MAR24-90000-C").await.unwrap(), 0.0125);
    assert_eq!(client.last_price("BTC-29MAR24-90000-C").await.unwrap(), 0.0125);
}

#[tokio::test]
async fn test_transaction_log_follows_continuation() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(rpc_method("private/get_transaction_log"))
        .and(body_partial_json(json!({"params": {"continuation": 42}})))
        .respond_with(rpc_result(json!({
            "logs": [{"id": 3}],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(rpc_method("private/get_transaction_log"))
        .and(body_partial_json(json!({"params": {"currency": "BTC", "query": "trade"}})))
        .respond_with(rpc_result(json!({
            "logs": [{"id": 1}, {"id": 2}],
            "continuation": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let start = Utc.timestamp_millis_opt(START_MS).unwrap();
    let logs = client
        .get_transaction_log("BTC", start, start + Duration::days(1), Some("trade"))
        .await
        .unwrap();

    let ids: Vec<_> = logs.iter().map(|l| l["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_transaction_log_stops_on_repeated_continuation() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(rpc_method("private/get_transaction_log"))
        .respond_with(rpc_result(json!({
            "logs": [{"id": 1}],
            "continuation": "stuck"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let start = Utc.timestamp_millis_opt(START_MS).unwrap();
    let logs = client
        .get_transaction_log("BTC", start, start + Duration::days(1), None)
        .await
        .unwrap();

    assert_eq!(logs.len(), 2);
}

#[tokio::test]
async fn test_delivery_log_queries_delivery() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/get_transaction_log",
            "params": {
                "currency": "ETH",
                "query": "delivery",
                "start_timestamp": START_MS,
                "end_timestamp": START_MS + 86_400_000
            }
        })))
        .respond_with(rpc_result(json!({
            "logs": [{"id": 7, "type": "delivery", "instrument_name": "ETH-29DEC23"}],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let start = Utc.timestamp_millis_opt(START_MS).unwrap();
    let logs = client
        .get_delivery_log("ETH", start, start + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["type"], "delivery");
}

#[tokio::test]
async fn test_flow_history_lists_deposits_then_transfers() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/get_transaction_log",
            "params": {"currency": "BTC", "query": "transfer"}
        })))
        .respond_with(rpc_result(json!({
            "logs": [{"id": 20, "type": "transfer"}],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/get_transaction_log",
            "params": {"currency": "BTC", "query": "deposit"}
        })))
        .respond_with(rpc_result(json!({
            "logs": [{"id": 10, "type": "deposit"}, {"id": 11, "type": "deposit"}],
            "continuation": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let start = Utc.timestamp_millis_opt(START_MS).unwrap();
    let flows = client
        .get_flow_history("BTC", start, start + Duration::days(1))
        .await
        .unwrap();

    let ids: Vec<_> = flows.iter().map(|l| l["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![10, 11, 20]);
}

#[tokio::test]
async fn test_min_trade_amount_reads_instrument() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/get_instrument",
            "params": {"instrument_name": "BTC-29MAR24-60000-C"}
        })))
        .respond_with(rpc_result(json!({
            "instrument_name": "BTC-29MAR24-60000-C",
            "kind": "option",
            "min_trade_amount": 0.1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    assert_eq!(
        client.get_min_trade_amount("BTC-29MAR24-60000-C").await.unwrap(),
        0.1
    );
}

#[tokio::test]
async fn test_closest_strike_uses_options_with_same_expiry() {
    let server = MockServer::start().await;
    let march = 1_711_699_200_000_i64;
    let april = 1_712_304_000_000_i64;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/ticker",
            "params": {"instrument_name": "BTC-29MAR24"}
        })))
        .respond_with(rpc_result(json!({"last_price": 41400.0, "mark_price": 41410.0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/get_instrument",
            "params": {"instrument_name": "BTC-29MAR24"}
        })))
        .respond_with(rpc_result(json!({
            "instrument_name": "BTC-29MAR24",
            "kind": "future",
            "base_currency": "BTC",
            "expiration_timestamp": march
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/get_instruments",
            "params": {"currency": "BTC", "kind": "option", "expired": false}
        })))
        .respond_with(rpc_result(json!([
            {"instrument_name": "BTC-29MAR24-40000-C", "kind": "option", "base_currency": "BTC",
             "strike": 40000.0, "expiration_timestamp": march},
            {"instrument_name": "BTC-29MAR24-42000-C", "kind": "option", "base_currency": "BTC",
             "strike": 42000.0, "expiration_timestamp": march},
            {"instrument_name": "BTC-5APR24-41500-C", "kind": "option", "base_currency": "BTC",
             "strike": 41500.0, "expiration_timestamp": april}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/get_instruments",
            "params": {"currency": "BTC", "kind": "option", "expired": true}
        })))
        .respond_with(rpc_result(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);

    let strike = client.get_closest_strike("BTC-29MAR24").await.unwrap();
    assert_eq!(strike, Some(42000.0));
}

#[tokio::test]
async fn test_nth_future_merges_active_and_expired() {
    let server = MockServer::start().await;
    let hour = 3_600_000;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/get_instruments",
            "params": {"currency": "BTC", "kind": "future", "expired": false}
        })))
        .respond_with(rpc_result(json!([
            {"instrument_name": "BTC-PERPETUAL", "kind": "future", "base_currency": "BTC",
             "quote_currency": "USD", "is_active": true, "expiration_timestamp": 32_503_680_000_000_i64},
            {"instrument_name": "BTC-2JAN24", "kind": "future", "base_currency": "BTC",
             "quote_currency": "USD", "is_active": true, "expiration_timestamp": START_MS + 8 * hour},
            {"instrument_name": "BTC-5JAN24", "kind": "future", "base_currency": "BTC",
             "quote_currency": "USD", "is_active": true, "expiration_timestamp": START_MS + 104 * hour}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "public/get_instruments",
            "params": {"expired": true}
        })))
        .respond_with(rpc_result(json!([
            {"instrument_name": "BTC-29DEC23", "kind": "future", "base_currency": "BTC",
             "quote_currency": "USD", "is_active": false, "expiration_timestamp": START_MS - 48 * hour}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let reference = Utc.timestamp_millis_opt(START_MS).unwrap();

    let first = client.get_first_future("BTC", reference).await.unwrap();
    assert_eq!(first.as_deref(), Some("BTC-5JAN24"));
}

#[tokio::test]
async fn test_nth_future_rejects_zero() {
    let server = MockServer::start().await;
    let clock = clock();
    let client = client(&server, &clock);

    let err = client
        .get_nth_future("BTC", 0, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

// ============================================================================
// Trading Tests
// ============================================================================

#[tokio::test]
async fn test_simulated_order_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(rpc_method("public/get_instrument"))
        .respond_with(rpc_result(json!({"instrument_name": "BTC-PERPETUAL", "kind": "future"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(rpc_method("public/ticker"))
        .respond_with(rpc_result(json!({"last_price": 42000.5, "mark_price": 42001.0})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(rpc_method("private/buy"))
        .respond_with(rpc_result(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    mount_auth(&server, "tok", 0).await;

    let clock = clock();
    let client = client(&server, &clock);
    assert!(client.is_simulated());

    let record = client
        .order(&Order::new("BTC-PERPETUAL", 10.0).with_label("sim"))
        .await
        .unwrap();

    assert_eq!(record["info"], deribit::api::SIMULATION_INFO);
    assert_eq!(record["timestamp"], START_MS);
    assert_eq!(record["kind"], "future");
    assert_eq!(record["side"], "buy");
    assert_eq!(record["amount"], 10.0);
    assert_eq!(record["price"], 42000.5);
    assert_eq!(record["fee"], 0);
    assert_eq!(record["label"], "sim");
}

#[tokio::test]
async fn test_zero_amount_order_is_empty() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let clock = clock();
    let client = live_client(&server, &clock);
    let result = client.order(&Order::new("BTC-PERPETUAL", 0.0)).await.unwrap();

    assert_eq!(result, json!({}));
}

#[tokio::test]
async fn test_live_order_routes_by_sign() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(json!({
            "method": "private/sell",
            "params": {
                "instrument_name": "ETH-PERPETUAL",
                "amount": 5.0,
                "type": "limit",
                "price": 2500.0,
                "reduce_only": true
            }
        })))
        .respond_with(rpc_result(json!({"order": {"order_id": "ETH-1", "direction": "sell"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/buy",
            "params": {"instrument_name": "ETH-PERPETUAL", "amount": 1.0, "type": "market"}
        })))
        .respond_with(rpc_result(json!({"order": {"order_id": "ETH-2", "direction": "buy"}})))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = live_client(&server, &clock);

    let sell = client
        .order(
            &Order::new("ETH-PERPETUAL", -5.0)
                .with_limit(2500.0)
                .reduce_only(true),
        )
        .await
        .unwrap();
    assert_eq!(sell["order"]["order_id"], "ETH-1");

    let buy = client
        .market_order("ETH-PERPETUAL", 1.0, None, false)
        .await
        .unwrap();
    assert_eq!(buy["order"]["direction"], "buy");
}

#[tokio::test]
async fn test_order_state_by_label_takes_first() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/get_order_state_by_label",
            "params": {"currency": "BTC", "label": "hedge"}
        })))
        .respond_with(rpc_result(json!([
            {"order_id": "1", "order_state": "filled"},
            {"order_id": "0", "order_state": "cancelled"}
        ])))
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let state = client
        .get_order_state_by_label("BTC", "hedge")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(state["order_id"], "1");
}

#[tokio::test]
async fn test_cancel_all_defaults() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/cancel_all_by_kind_or_type",
            "params": {"currency": "BTC", "kind": "any", "type": "all"}
        })))
        .respond_with(rpc_result(json!(3)))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let cancelled = client
        .cancel_all_by_kind_or_type("BTC", None, None)
        .await
        .unwrap();

    assert_eq!(cancelled, 3);
}

#[tokio::test]
async fn test_portfolio_margins_one_request_per_currency() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/get_portfolio_margins",
            "params": {
                "currency": "BTC",
                "add_positions": true,
                "simulated_positions": {"BTC-PERPETUAL": 100.0}
            }
        })))
        .respond_with(rpc_result(json!({"initial_margin": 0.01})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "private/get_portfolio_margins",
            "params": {"currency": "ETH"}
        })))
        .respond_with(rpc_result(json!({"initial_margin": 0.2})))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let margins = client
        .get_portfolio_margins(
            &[
                ("BTC-PERPETUAL".to_string(), 100.0),
                ("ETH-29MAR24".to_string(), -2.0),
            ],
            true,
        )
        .await
        .unwrap();

    assert_eq!(margins["BTC"]["initial_margin"], 0.01);
    assert_eq!(margins["ETH"]["initial_margin"], 0.2);
}

#[tokio::test]
async fn test_close_position_with_limit_price() {
    let server = MockServer::start().await;
    mount_auth(&server, "tok", 1).await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(json!({
            "method": "private/close_position",
            "params": {"instrument_name": "BTC-PERPETUAL", "type": "limit", "price": 41000.0}
        })))
        .respond_with(rpc_result(json!({"order": {"order_id": "BTC-9", "order_type": "limit"}})))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = client(&server, &clock);
    let closed = client
        .close_position("BTC-PERPETUAL", Some(41000.0))
        .await
        .unwrap();

    assert_eq!(closed["order"]["order_type"], "limit");
}
