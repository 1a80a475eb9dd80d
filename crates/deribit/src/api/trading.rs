//! Order placement and order management.
//!
//! Placing an order honours the client's simulated flag: a simulated
//! client prices the order and returns a synthesized record without
//! sending anything.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::DeribitClient;
use crate::error::{Error, InvalidInputError};
use crate::rpc::endpoints::{
    BUY, CANCEL_ALL_BY_KIND_OR_TYPE, CANCEL_BY_LABEL, CLOSE_POSITION, GET_MARGINS,
    GET_OPEN_ORDERS, GET_ORDER_STATE, GET_ORDER_STATE_BY_LABEL, GET_USER_TRADES_BY_ORDER, SELL,
};
use crate::types::InstrumentKind;

use super::into_array;

/// Info string carried by simulated order records.
pub const SIMULATION_INFO: &str = "SIMULATION MODE - no trade executed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Side::Buy => BUY,
            Side::Sell => SELL,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        }
    }
}

/// An order request.
///
/// The sign of `amount` selects the side: positive buys, negative sells.
/// Orders are market orders unless a limit price is set.
///
/// # Example
///
/// ```
/// use deribit::Order;
///
/// let order = Order::new("BTC-PERPETUAL", -10.0)
///     .with_limit(65_000.0)
///     .with_label("hedge")
///     .reduce_only(true);
/// assert_eq!(order.side(), Some(deribit::Side::Sell));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    instrument_name: String,
    amount: f64,
    limit: Option<f64>,
    label: Option<String>,
    reduce_only: bool,
}

impl Order {
    pub fn new(instrument_name: impl Into<String>, amount: f64) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            amount,
            limit: None,
            label: None,
            reduce_only: false,
        }
    }

    pub fn with_limit(mut self, price: f64) -> Self {
        self.limit = Some(price);
        self
    }

    /// Attach a label. An empty label means no label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn instrument_name(&self) -> &str {
        &self.instrument_name
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn limit(&self) -> Option<f64> {
        self.limit
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_reduce_only(&self) -> bool {
        self.reduce_only
    }

    /// Side implied by the amount; `None` for a zero amount.
    pub fn side(&self) -> Option<Side> {
        if self.amount > 0.0 {
            Some(Side::Buy)
        } else if self.amount < 0.0 {
            Some(Side::Sell)
        } else {
            None
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self.limit {
            Some(_) => OrderType::Limit,
            None => OrderType::Market,
        }
    }

    fn validate(&self) -> Result<(), InvalidInputError> {
        if !self.amount.is_finite() {
            return Err(InvalidInputError::Amount {
                value: self.amount,
                reason: "amount must be a finite number".to_string(),
            });
        }
        if let Some(limit) = self.limit
            && !(limit.is_finite() && limit > 0.0)
        {
            return Err(InvalidInputError::Other {
                message: format!("limit price {} must be positive", limit),
            });
        }
        Ok(())
    }

    /// Params for `private/buy` / `private/sell`.
    fn params(&self) -> Value {
        let mut params = json!({
            "instrument_name": self.instrument_name,
            "amount": self.amount.abs(),
            "type": self.order_type().as_str(),
            "reduce_only": self.reduce_only,
        });
        if let Some(limit) = self.limit {
            params["price"] = json!(limit);
        }
        if let Some(label) = &self.label {
            params["label"] = json!(label);
        }
        params
    }
}

impl DeribitClient {
    /// Place an order.
    ///
    /// A zero amount places nothing and returns an empty object. On a
    /// simulated client the order is priced at its limit (or the last
    /// price) and a synthesized record is returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] for a non-finite amount or a
    /// non-positive limit price.
    #[instrument(skip(self), fields(simulated = self.is_simulated()))]
    pub async fn order(&self, order: &Order) -> Result<Value, Error> {
        order.validate()?;

        let Some(side) = order.side() else {
            return Ok(json!({}));
        };

        if self.is_simulated() {
            return self.simulate(order, side).await;
        }

        info!(
            instrument = order.instrument_name(),
            %side,
            amount = order.amount().abs(),
            "Sending order"
        );
        self.request(side.endpoint(), order.params()).await
    }

    /// Place a market order.
    pub async fn market_order(
        &self,
        instrument_name: &str,
        amount: f64,
        label: Option<&str>,
        reduce_only: bool,
    ) -> Result<Value, Error> {
        let mut order = Order::new(instrument_name, amount).reduce_only(reduce_only);
        if let Some(label) = label {
            order = order.with_label(label);
        }
        self.order(&order).await
    }

    async fn simulate(&self, order: &Order, side: Side) -> Result<Value, Error> {
        let kind = self.get_kind(order.instrument_name()).await?;
        let price = match order.limit() {
            Some(limit) => limit,
            None => self.last_price(order.instrument_name()).await?,
        };

        info!(instrument = order.instrument_name(), %side, price, "Simulated order");
        Ok(json!({
            "info": SIMULATION_INFO,
            "timestamp": self.now().timestamp_millis(),
            "kind": kind,
            "instrument_name": order.instrument_name(),
            "side": side,
            "amount": order.amount().abs(),
            "price": price,
            "fee": 0,
            "label": order.label(),
        }))
    }

    /// Close the whole position on an instrument, at market or at `limit`.
    #[instrument(skip(self))]
    pub async fn close_position(
        &self,
        instrument_name: &str,
        limit: Option<f64>,
    ) -> Result<Value, Error> {
        let mut params = json!({"instrument_name": instrument_name, "type": "market"});
        if let Some(limit) = limit {
            params["type"] = json!("limit");
            params["price"] = json!(limit);
        }
        self.request(CLOSE_POSITION, params).await
    }

    /// Margin required to buy or sell `amount` at `price` (default: last
    /// price). The result carries `buy` and `sell` margins.
    #[instrument(skip(self))]
    pub async fn get_margins(
        &self,
        instrument_name: &str,
        amount: f64,
        price: Option<f64>,
    ) -> Result<Value, Error> {
        let price = match price {
            Some(price) => price,
            None => self.last_price(instrument_name).await?,
        };
        let params = json!({
            "instrument_name": instrument_name,
            "amount": amount,
            "price": price,
        });
        self.request(GET_MARGINS, params).await
    }

    #[instrument(skip(self))]
    pub async fn get_open_orders(&self) -> Result<Vec<Value>, Error> {
        into_array(self.request(GET_OPEN_ORDERS, json!({})).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_order_state(&self, order_id: &str) -> Result<Value, Error> {
        self.request(GET_ORDER_STATE, json!({"order_id": order_id}))
            .await
    }

    /// State of the most recent order carrying `label`, if any.
    #[instrument(skip(self))]
    pub async fn get_order_state_by_label(
        &self,
        currency: &str,
        label: &str,
    ) -> Result<Option<Value>, Error> {
        if label.is_empty() {
            return Err(InvalidInputError::Other {
                message: "order label must be provided".to_string(),
            }
            .into());
        }

        let params = json!({"currency": currency, "label": label});
        Ok(first_order(self.request(GET_ORDER_STATE_BY_LABEL, params).await?))
    }

    #[instrument(skip(self))]
    pub async fn get_user_trades_by_order(&self, order_id: &str) -> Result<Vec<Value>, Error> {
        let params = json!({"order_id": order_id});
        into_array(self.request(GET_USER_TRADES_BY_ORDER, params).await?)
    }

    /// Cancel every open order carrying `label`.
    #[instrument(skip(self))]
    pub async fn cancel_by_label(
        &self,
        label: &str,
        currency: Option<&str>,
    ) -> Result<Value, Error> {
        let mut params = json!({"label": label});
        if let Some(currency) = currency {
            params["currency"] = json!(currency);
        }
        self.request(CANCEL_BY_LABEL, params).await
    }

    /// Cancel open orders on `currency`, optionally restricted by
    /// instrument kind and order type. Unrestricted means `any` / `all`.
    #[instrument(skip(self))]
    pub async fn cancel_all_by_kind_or_type(
        &self,
        currency: &str,
        kind: Option<InstrumentKind>,
        order_type: Option<&str>,
    ) -> Result<Value, Error> {
        let params = json!({
            "currency": currency,
            "kind": kind.map_or("any", InstrumentKind::as_str),
            "type": order_type.unwrap_or("all"),
        });
        self.request(CANCEL_ALL_BY_KIND_OR_TYPE, params).await
    }
}

fn first_order(result: Value) -> Option<Value> {
    match result {
        Value::Array(orders) => orders.into_iter().next(),
        Value::Null => None,
        other => Some(other),
    }
}
