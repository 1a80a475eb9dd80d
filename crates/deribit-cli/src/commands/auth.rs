//! Auth command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::cli::GlobalArgs;
use crate::{config, output};

#[derive(Args, Debug)]
pub struct AuthArgs {}

pub async fn run(_args: AuthArgs, global: &GlobalArgs) -> Result<()> {
    let client = config::client(global, false)?;

    output::progress("Authenticating...");
    let token = client
        .authenticate()
        .await
        .context("Failed to authenticate")?;

    output::success("Authenticated");
    output::print(
        &json!({
            "environment": client.environment().as_str(),
            "scope": token.scope(),
            "expires_at": token.expires_at().to_rfc3339(),
        }),
        global.pretty,
    )
}
