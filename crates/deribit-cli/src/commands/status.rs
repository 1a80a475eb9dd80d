//! Status command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::cli::GlobalArgs;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(_args: StatusArgs, global: &GlobalArgs) -> Result<()> {
    let client = config::client(global, false)?;

    let time = client.get_time().await.context("Failed to get server time")?;
    let status = client.get_status().await.context("Failed to get status")?;
    let version = client
        .get_api_version()
        .await
        .context("Failed to get API version")?;

    output::print(
        &json!({
            "environment": client.environment().as_str(),
            "server_time": time,
            "status": status,
            "api_version": version,
        }),
        global.pretty,
    )
}
