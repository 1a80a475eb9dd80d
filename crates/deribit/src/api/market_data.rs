//! Public market data.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::DeribitClient;
use crate::error::{Error, InvalidInputError};
use crate::rpc::Method;
use crate::rpc::endpoints::{
    GET_BOOK_SUMMARY_BY_CURRENCY, GET_BOOK_SUMMARY_BY_INSTRUMENT, GET_CONTRACT_SIZE,
    GET_CURRENCIES, GET_INSTRUMENT, GET_INSTRUMENTS, GET_TRADINGVIEW_CHART_DATA, TICKER,
};
use crate::types::InstrumentKind;

use super::{f64_field, field, into_array, str_field};

/// A future must expire at least this long after the reference time to
/// count in [`DeribitClient::get_nth_future`].
const NTH_FUTURE_MIN_LIFETIME_HOURS: i64 = 25;

impl DeribitClient {
    /// All supported currencies with their metadata.
    #[instrument(skip(self))]
    pub async fn get_currencies(&self) -> Result<Vec<Value>, Error> {
        let result = self
            .call(GET_CURRENCIES, Method::Get, &json!({}), false)
            .await?;
        into_array(result)
    }

    /// Codes of all supported currencies.
    pub async fn currencies(&self) -> Result<Vec<String>, Error> {
        self.get_currencies()
            .await?
            .iter()
            .map(|c| str_field(c, "currency").map(str::to_string))
            .collect()
    }

    /// Contract size of an instrument, or `None` if the server reports none.
    #[instrument(skip(self))]
    pub async fn get_contract_size(&self, instrument_name: &str) -> Result<Option<f64>, Error> {
        let result = self
            .request(GET_CONTRACT_SIZE, json!({"instrument_name": instrument_name}))
            .await?;
        let size = result.get("contract_size").and_then(Value::as_f64);
        if size.is_none() {
            warn!(instrument_name, "No contract size reported");
        }
        Ok(size)
    }

    #[instrument(skip(self))]
    pub async fn get_ticker(&self, instrument_name: &str) -> Result<Value, Error> {
        self.request(TICKER, json!({"instrument_name": instrument_name}))
            .await
    }

    /// Last traded price, falling back to the mark price when the
    /// instrument has not traded.
    pub async fn last_price(&self, instrument_name: &str) -> Result<f64, Error> {
        let ticker = self.get_ticker(instrument_name).await?;
        last_price_of(&ticker, instrument_name)
    }

    /// Mid of best bid and ask.
    ///
    /// With only one side quoted that side is used; with an empty book the
    /// mark price is used.
    pub async fn mid_price(&self, instrument_name: &str) -> Result<f64, Error> {
        let ticker = self.get_ticker(instrument_name).await?;
        mid_price_of(&ticker, instrument_name)
    }

    #[instrument(skip(self))]
    pub async fn get_book_summary_by_currency(
        &self,
        currency: &str,
        kind: Option<InstrumentKind>,
    ) -> Result<Vec<Value>, Error> {
        let mut params = json!({"currency": currency});
        if let Some(kind) = kind {
            params["kind"] = json!(kind);
        }
        into_array(self.request(GET_BOOK_SUMMARY_BY_CURRENCY, params).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_book_summary_by_instrument(
        &self,
        instrument_name: &str,
    ) -> Result<Vec<Value>, Error> {
        let params = json!({"instrument_name": instrument_name});
        into_array(self.request(GET_BOOK_SUMMARY_BY_INSTRUMENT, params).await?)
    }

    /// Active and expired instruments on `currency`.
    ///
    /// Both lists are merged, de-duplicated by `instrument_name` and sorted
    /// by kind, base currency and expiry.
    #[instrument(skip(self))]
    pub async fn get_instruments(
        &self,
        currency: &str,
        kind: Option<InstrumentKind>,
    ) -> Result<Vec<Value>, Error> {
        let mut merged = Vec::new();
        for expired in [false, true] {
            let mut params = json!({"currency": currency, "expired": expired});
            if let Some(kind) = kind {
                params["kind"] = json!(kind);
            }
            merged.extend(into_array(self.request(GET_INSTRUMENTS, params).await?)?);
        }

        let instruments = dedup_and_sort(merged);
        debug!(count = instruments.len(), "Instruments loaded");
        Ok(instruments)
    }

    /// Names of the active and expired instruments on `currency`.
    pub async fn get_instrument_names(
        &self,
        currency: &str,
        kind: Option<InstrumentKind>,
    ) -> Result<Vec<String>, Error> {
        self.get_instruments(currency, kind)
            .await?
            .iter()
            .map(|i| str_field(i, "instrument_name").map(str::to_string))
            .collect()
    }

    #[instrument(skip(self))]
    pub async fn get_instrument(&self, instrument_name: &str) -> Result<Value, Error> {
        self.request(GET_INSTRUMENT, json!({"instrument_name": instrument_name}))
            .await
    }

    /// Kind of an instrument (`future`, `option`, ...).
    pub async fn get_kind(&self, instrument_name: &str) -> Result<String, Error> {
        let instrument = self.get_instrument(instrument_name).await?;
        Ok(str_field(&instrument, "kind")?.to_string())
    }

    pub async fn get_expiry(&self, instrument_name: &str) -> Result<DateTime<Utc>, Error> {
        let instrument = self.get_instrument(instrument_name).await?;
        expiry_of(&instrument)
    }

    pub async fn get_min_trade_amount(&self, instrument_name: &str) -> Result<f64, Error> {
        let instrument = self.get_instrument(instrument_name).await?;
        f64_field(&instrument, "min_trade_amount")
    }

    /// OHLCV candles between `start` and `end`.
    ///
    /// `resolution` is a number of minutes (`"1"`, `"60"`, ...) or `"1D"`.
    #[instrument(skip(self))]
    pub async fn get_tradingview_chart_data(
        &self,
        instrument_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: &str,
    ) -> Result<Value, Error> {
        let params = json!({
            "instrument_name": instrument_name,
            "start_timestamp": start.timestamp_millis(),
            "end_timestamp": end.timestamp_millis(),
            "resolution": resolution,
        });
        let result = self.request(GET_TRADINGVIEW_CHART_DATA, params).await?;
        if result.get("status").and_then(Value::as_str) != Some("ok") {
            warn!(instrument_name, status = ?result.get("status"), "No chart data found");
        }
        Ok(result)
    }

    /// The `n`-th (1-based) active non-USDC future on `currency`.
    ///
    /// Only futures expiring at least 25 hours after `reference` count. If
    /// fewer than `n` qualify, the latest-expiring one is returned.
    pub async fn get_nth_future(
        &self,
        currency: &str,
        n: usize,
        reference: DateTime<Utc>,
    ) -> Result<Option<String>, Error> {
        if n == 0 {
            return Err(InvalidInputError::Other {
                message: "future index is 1-based".to_string(),
            }
            .into());
        }
        let futures = self
            .get_instruments(currency, Some(InstrumentKind::Future))
            .await?;
        Ok(nth_future(&futures, n, reference))
    }

    pub async fn get_first_future(
        &self,
        currency: &str,
        reference: DateTime<Utc>,
    ) -> Result<Option<String>, Error> {
        self.get_nth_future(currency, 1, reference).await
    }

    /// Strike of the option closest to the last price of `future`, among
    /// options that expire with it.
    pub async fn get_closest_strike(&self, future: &str) -> Result<Option<f64>, Error> {
        let last = self.last_price(future).await?;
        let instrument = self.get_instrument(future).await?;
        let currency = str_field(&instrument, "base_currency")?;
        let expiry = field(&instrument, "expiration_timestamp")?.as_i64();

        let options = self
            .get_instruments(currency, Some(InstrumentKind::Option))
            .await?;
        Ok(closest_strike(&options, expiry, last))
    }
}

fn last_price_of(ticker: &Value, instrument_name: &str) -> Result<f64, Error> {
    match ticker.get("last_price").and_then(Value::as_f64) {
        Some(price) => Ok(price),
        None => {
            warn!(instrument_name, "Using mark price instead of last price");
            f64_field(ticker, "mark_price")
        }
    }
}

fn mid_price_of(ticker: &Value, instrument_name: &str) -> Result<f64, Error> {
    let bid = ticker.get("best_bid_price").and_then(Value::as_f64);
    let ask = ticker.get("best_ask_price").and_then(Value::as_f64);
    // Deribit reports an empty side as 0.
    let bid = bid.filter(|p| *p > 0.0);
    let ask = ask.filter(|p| *p > 0.0);

    match (bid, ask) {
        (Some(bid), Some(ask)) => Ok((bid + ask) / 2.0),
        (Some(bid), None) => {
            warn!(instrument_name, "No ask available for mid calculation");
            Ok(bid)
        }
        (None, Some(ask)) => {
            warn!(instrument_name, "No bid available for mid calculation");
            Ok(ask)
        }
        (None, None) => {
            warn!(instrument_name, "Using mark price instead of mid price");
            f64_field(ticker, "mark_price")
        }
    }
}

fn expiry_of(instrument: &Value) -> Result<DateTime<Utc>, Error> {
    let millis = field(instrument, "expiration_timestamp")?
        .as_i64()
        .ok_or_else(|| Error::Decode {
            message: "field `expiration_timestamp` is not an integer".to_string(),
        })?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Error::Decode {
            message: format!("expiration timestamp {} out of range", millis),
        })
}

fn dedup_and_sort(instruments: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Value> = instruments
        .into_iter()
        .filter(|i| match i.get("instrument_name").and_then(Value::as_str) {
            Some(name) => seen.insert(name.to_string()),
            None => true,
        })
        .collect();

    let key = |i: &Value| {
        (
            i.get("kind").and_then(Value::as_str).unwrap_or_default().to_string(),
            i.get("base_currency")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            i.get("expiration_timestamp")
                .and_then(Value::as_i64)
                .unwrap_or(i64::MAX),
        )
    };
    unique.sort_by_key(key);
    unique
}

fn nth_future(futures: &[Value], n: usize, reference: DateTime<Utc>) -> Option<String> {
    let cutoff = (reference + Duration::hours(NTH_FUTURE_MIN_LIFETIME_HOURS)).timestamp_millis();

    let mut candidates: Vec<(i64, &str)> = futures
        .iter()
        .filter(|f| f.get("quote_currency").and_then(Value::as_str) != Some("USDC"))
        .filter(|f| f.get("is_active").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|f| {
            let expiry = f.get("expiration_timestamp").and_then(Value::as_i64)?;
            let name = f.get("instrument_name").and_then(Value::as_str)?;
            (expiry >= cutoff).then_some((expiry, name))
        })
        .collect();
    candidates.sort();

    candidates
        .get(n - 1)
        .or(candidates.last())
        .map(|(_, name)| name.to_string())
}

fn closest_strike(options: &[Value], expiry: Option<i64>, price: f64) -> Option<f64> {
    options
        .iter()
        .filter(|o| o.get("expiration_timestamp").and_then(Value::as_i64) == expiry)
        .filter_map(|o| o.get("strike").and_then(Value::as_f64))
        .min_by(|a, b| {
            (a - price)
                .abs()
                .partial_cmp(&(b - price).abs())
                .unwrap_or(Ordering::Equal)
        })
}
