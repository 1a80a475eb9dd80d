//! Account subcommands.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde_json::json;

use deribit::InstrumentKind;

use super::{KindArg, parse_time};
use crate::cli::GlobalArgs;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountSubcommand {
    /// Extended account summary
    Summary {
        currency: String,
    },

    /// Open positions
    Positions {
        currency: String,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Transaction log entries
    Transactions {
        currency: String,

        /// Start (RFC 3339 or YYYY-MM-DD); defaults to 30 days before --end
        #[arg(long, value_parser = parse_time)]
        start: Option<DateTime<Utc>>,

        /// End (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long, value_parser = parse_time)]
        end: Option<DateTime<Utc>>,

        /// Entry type filter, e.g. trade, delivery, deposit
        #[arg(long)]
        query: Option<String>,
    },

    /// Subaccounts of the main account
    Subaccounts {
        /// Include portfolio details
        #[arg(long)]
        portfolio: bool,
    },
}

pub async fn handle(cmd: AccountCommand, global: &GlobalArgs) -> Result<()> {
    let client = config::client(global, false)?;

    let result = match cmd.command {
        AccountSubcommand::Summary { currency } => client
            .get_account_summary(&currency)
            .await
            .context("Failed to get account summary")?,
        AccountSubcommand::Positions { currency, kind } => json!(
            client
                .get_positions(&currency, kind.map(InstrumentKind::from))
                .await
                .context("Failed to get positions")?
        ),
        AccountSubcommand::Transactions {
            currency,
            start,
            end,
            query,
        } => {
            let end = end.unwrap_or_else(Utc::now);
            let start = start.unwrap_or(end - Duration::days(30));
            json!(
                client
                    .get_transaction_log(&currency, start, end, query.as_deref())
                    .await
                    .context("Failed to get transaction log")?
            )
        }
        AccountSubcommand::Subaccounts { portfolio } => json!(
            client
                .get_subaccounts(portfolio)
                .await
                .context("Failed to get subaccounts")?
        ),
    };

    output::print(&result, global.pretty)
}
