//! Trading subcommands.
//!
//! Orders are simulated unless `--live` is given or the stored config
//! disables simulation.

use anyhow::{Context, Result, ensure};
use clap::{Args, Subcommand};
use serde_json::json;

use deribit::{InstrumentKind, Order};

use super::KindArg;
use crate::cli::GlobalArgs;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct TradeCommand {
    #[command(subcommand)]
    pub command: TradeSubcommand,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Instrument to trade, e.g. BTC-PERPETUAL
    pub instrument: String,

    /// Amount (contracts or coins, depending on the instrument)
    pub amount: f64,

    /// Limit price; market order when omitted
    #[arg(long)]
    pub limit: Option<f64>,

    #[arg(long)]
    pub label: Option<String>,

    /// Only reduce an existing position
    #[arg(long)]
    pub reduce_only: bool,

    /// Send the order instead of simulating it
    #[arg(long)]
    pub live: bool,
}

impl OrderArgs {
    fn to_order(&self, sign: f64) -> Order {
        let mut order = Order::new(&self.instrument, sign * self.amount.abs())
            .reduce_only(self.reduce_only);
        if let Some(limit) = self.limit {
            order = order.with_limit(limit);
        }
        if let Some(label) = &self.label {
            order = order.with_label(label);
        }
        order
    }
}

#[derive(Subcommand, Debug)]
pub enum TradeSubcommand {
    /// Place a buy order
    Buy(OrderArgs),

    /// Place a sell order
    Sell(OrderArgs),

    /// Close a position
    Close {
        instrument: String,

        /// Limit price; market when omitted
        #[arg(long)]
        limit: Option<f64>,
    },

    /// List open orders
    OpenOrders,

    /// State of an order
    OrderState {
        order_id: String,
    },

    /// State of the latest order with a label
    OrderStateByLabel {
        label: String,

        #[arg(long, default_value = "BTC")]
        currency: String,
    },

    /// Trades filling an order
    Trades {
        order_id: String,
    },

    /// Cancel orders by label
    CancelLabel {
        label: String,

        #[arg(long)]
        currency: Option<String>,
    },

    /// Cancel all orders on a currency
    CancelAll {
        currency: String,

        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Order type filter, e.g. limit, trigger_all
        #[arg(long = "type")]
        order_type: Option<String>,
    },
}

pub async fn handle(cmd: TradeCommand, global: &GlobalArgs) -> Result<()> {
    let result = match cmd.command {
        TradeSubcommand::Buy(args) => place(&args, 1.0, global).await?,
        TradeSubcommand::Sell(args) => place(&args, -1.0, global).await?,
        TradeSubcommand::Close { instrument, limit } => config::client(global, false)?
            .close_position(&instrument, limit)
            .await
            .context("Failed to close position")?,
        TradeSubcommand::OpenOrders => json!(
            config::client(global, false)?
                .get_open_orders()
                .await
                .context("Failed to get open orders")?
        ),
        TradeSubcommand::OrderState { order_id } => config::client(global, false)?
            .get_order_state(&order_id)
            .await
            .context("Failed to get order state")?,
        TradeSubcommand::OrderStateByLabel { label, currency } => json!(
            config::client(global, false)?
                .get_order_state_by_label(&currency, &label)
                .await
                .context("Failed to get order state")?
        ),
        TradeSubcommand::Trades { order_id } => json!(
            config::client(global, false)?
                .get_user_trades_by_order(&order_id)
                .await
                .context("Failed to get trades")?
        ),
        TradeSubcommand::CancelLabel { label, currency } => config::client(global, false)?
            .cancel_by_label(&label, currency.as_deref())
            .await
            .context("Failed to cancel orders")?,
        TradeSubcommand::CancelAll {
            currency,
            kind,
            order_type,
        } => config::client(global, false)?
            .cancel_all_by_kind_or_type(
                &currency,
                kind.map(InstrumentKind::from),
                order_type.as_deref(),
            )
            .await
            .context("Failed to cancel orders")?,
    };

    output::print(&result, global.pretty)
}

async fn place(args: &OrderArgs, sign: f64, global: &GlobalArgs) -> Result<serde_json::Value> {
    ensure!(args.amount != 0.0, "amount must be non-zero");

    let client = config::client(global, args.live)?;
    let order = args.to_order(sign);

    if client.is_simulated() {
        output::progress("Simulated order; pass --live to send it.");
    }

    client.order(&order).await.context("Failed to place order")
}
