//! Instrument kinds and instrument naming.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Instrument kind accepted by the `kind` request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Future,
    Option,
    Spot,
    FutureCombo,
    OptionCombo,
}

impl InstrumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Future => "future",
            InstrumentKind::Option => "option",
            InstrumentKind::Spot => "spot",
            InstrumentKind::FutureCombo => "future_combo",
            InstrumentKind::OptionCombo => "option_combo",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// Name of the future on `currency` expiring on `expiry`, e.g. `BTC-5JAN24`.
pub fn future_name(currency: &str, expiry: NaiveDate) -> String {
    format!("{}-{}", currency, expiry.format("%-d%b%y")).to_uppercase()
}

/// Name of an option, e.g. `BTC-5JAN24-40000-C`.
///
/// Fractional strikes are truncated.
pub fn option_name(currency: &str, expiry: NaiveDate, strike: f64, option_type: OptionType) -> String {
    let suffix = match option_type {
        OptionType::Call => "C",
        OptionType::Put => "P",
    };
    format!(
        "{}-{}-{}",
        future_name(currency, expiry),
        strike.trunc() as i64,
        suffix
    )
}

/// Base currency encoded in an instrument name (`BTC-PERPETUAL` -> `BTC`).
///
/// Linear instruments such as `SOL_USDC-PERPETUAL` report their base asset.
pub fn base_currency(instrument_name: &str) -> &str {
    let head = instrument_name.split('-').next().unwrap_or(instrument_name);
    head.split('_').next().unwrap_or(head)
}
