//! Market data subcommands.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde_json::json;

use deribit::InstrumentKind;

use super::{KindArg, parse_time};
use crate::cli::GlobalArgs;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct MarketCommand {
    #[command(subcommand)]
    pub command: MarketSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MarketSubcommand {
    /// List supported currencies
    Currencies,

    /// Ticker of an instrument
    Ticker {
        instrument: String,
    },

    /// Instrument metadata
    Instrument {
        instrument: String,
    },

    /// Active and expired instruments on a currency
    Instruments {
        currency: String,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Print instrument names only
        #[arg(long)]
        names: bool,
    },

    /// Book summaries on a currency
    Book {
        currency: String,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// OHLCV candles
    History {
        instrument: String,

        /// Start (RFC 3339 or YYYY-MM-DD); defaults to one day before --end
        #[arg(long, value_parser = parse_time)]
        start: Option<DateTime<Utc>>,

        /// End (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long, value_parser = parse_time)]
        end: Option<DateTime<Utc>>,

        /// Candle size in minutes, or 1D
        #[arg(long, default_value = "60")]
        resolution: String,
    },

    /// Mid of best bid and ask
    MidPrice {
        instrument: String,
    },

    /// The n-th listed future on a currency
    NthFuture {
        currency: String,

        #[arg(long, default_value_t = 1)]
        n: usize,
    },
}

pub async fn handle(cmd: MarketCommand, global: &GlobalArgs) -> Result<()> {
    let client = config::client(global, false)?;

    let result = match cmd.command {
        MarketSubcommand::Currencies => json!(
            client
                .get_currencies()
                .await
                .context("Failed to get currencies")?
        ),
        MarketSubcommand::Ticker { instrument } => client
            .get_ticker(&instrument)
            .await
            .context("Failed to get ticker")?,
        MarketSubcommand::Instrument { instrument } => client
            .get_instrument(&instrument)
            .await
            .context("Failed to get instrument")?,
        MarketSubcommand::Instruments {
            currency,
            kind,
            names,
        } => {
            let kind = kind.map(InstrumentKind::from);
            if names {
                json!(
                    client
                        .get_instrument_names(&currency, kind)
                        .await
                        .context("Failed to list instruments")?
                )
            } else {
                json!(
                    client
                        .get_instruments(&currency, kind)
                        .await
                        .context("Failed to list instruments")?
                )
            }
        }
        MarketSubcommand::Book { currency, kind } => json!(
            client
                .get_book_summary_by_currency(&currency, kind.map(InstrumentKind::from))
                .await
                .context("Failed to get book summary")?
        ),
        MarketSubcommand::History {
            instrument,
            start,
            end,
            resolution,
        } => {
            let end = end.unwrap_or_else(Utc::now);
            let start = start.unwrap_or(end - Duration::days(1));
            client
                .get_tradingview_chart_data(&instrument, start, end, &resolution)
                .await
                .context("Failed to get chart data")?
        }
        MarketSubcommand::MidPrice { instrument } => {
            let mid = client
                .mid_price(&instrument)
                .await
                .context("Failed to get mid price")?;
            json!({"instrument_name": instrument, "mid_price": mid})
        }
        MarketSubcommand::NthFuture { currency, n } => {
            let future = client
                .get_nth_future(&currency, n, Utc::now())
                .await
                .context("Failed to find future")?;
            json!({"currency": currency, "n": n, "instrument_name": future})
        }
    };

    output::print(&result, global.pretty)
}
