//! Subcommand implementations.

mod account;
mod auth;
mod call;
mod configure;
mod market;
mod show_config;
mod status;
mod trade;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};

use deribit::InstrumentKind;

use crate::cli::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store credentials and defaults
    Configure(configure::ConfigureArgs),

    /// Display the stored configuration
    ShowConfig(show_config::ShowConfigArgs),

    /// Authenticate and display the issued token's scope and expiry
    Auth(auth::AuthArgs),

    /// Server time, platform status and API version
    Status(status::StatusArgs),

    /// Public market data
    Market(market::MarketCommand),

    /// Account queries
    Account(account::AccountCommand),

    /// Order placement and management
    Trade(trade::TradeCommand),

    /// Call any endpoint directly
    Call(call::CallArgs),
}

pub async fn handle(cmd: Commands, global: &GlobalArgs) -> Result<()> {
    match cmd {
        Commands::Configure(args) => configure::run(args, global),
        Commands::ShowConfig(args) => show_config::run(args, global),
        Commands::Auth(args) => auth::run(args, global).await,
        Commands::Status(args) => status::run(args, global).await,
        Commands::Market(cmd) => market::handle(cmd, global).await,
        Commands::Account(cmd) => account::handle(cmd, global).await,
        Commands::Trade(cmd) => trade::handle(cmd, global).await,
        Commands::Call(args) => call::run(args, global).await,
    }
}

/// Instrument kind accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Future,
    Option,
    Spot,
    FutureCombo,
    OptionCombo,
}

impl From<KindArg> for InstrumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Future => InstrumentKind::Future,
            KindArg::Option => InstrumentKind::Option,
            KindArg::Spot => InstrumentKind::Spot,
            KindArg::FutureCombo => InstrumentKind::FutureCombo,
            KindArg::OptionCombo => InstrumentKind::OptionCombo,
        }
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(s) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }
    bail!("'{}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date", s)
}
