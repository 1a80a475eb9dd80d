//! Raw call command implementation.

use anyhow::{Context, Result, ensure};
use clap::Args;
use serde_json::Value;

use deribit::Method;
use deribit::rpc::endpoints::is_private;

use crate::cli::GlobalArgs;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Endpoint name, e.g. public/ticker or private/get_positions
    pub endpoint: String,

    /// Params as a JSON object
    #[arg(long, default_value = "{}")]
    pub params: String,

    /// Send a GET request with the params as a query string
    #[arg(long)]
    pub get: bool,
}

pub async fn run(args: CallArgs, global: &GlobalArgs) -> Result<()> {
    let params: Value = serde_json::from_str(&args.params).context("Invalid --params JSON")?;
    ensure!(params.is_object(), "--params must be a JSON object");

    let method = if args.get { Method::Get } else { Method::Post };
    let client = config::client(global, false)?;

    let result = client
        .call(&args.endpoint, method, &params, is_private(&args.endpoint))
        .await
        .with_context(|| format!("{} failed", args.endpoint))?;

    output::print(&result, global.pretty)
}
