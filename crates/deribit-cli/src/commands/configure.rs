//! Configure command implementation.

use anyhow::{Context, Result};
use clap::Args;

use deribit::Environment;

use crate::cli::GlobalArgs;
use crate::config::StoredConfig;
use crate::config::storage;
use crate::output;

/// Credentials come from the global `--client-id` / `--client-secret`
/// options (or their environment variables).
#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Send orders for real instead of simulating them
    #[arg(long)]
    pub live: bool,
}

pub fn run(args: ConfigureArgs, global: &GlobalArgs) -> Result<()> {
    let environment = match &global.environment {
        Some(env) => env.parse::<Environment>().context("Invalid environment")?,
        None => Environment::default(),
    };
    let client_id = global
        .client_id
        .clone()
        .context("--client-id (or DERIBIT_CLIENT_ID) is required")?;
    let client_secret = global
        .client_secret
        .clone()
        .context("--client-secret (or DERIBIT_CLIENT_SECRET) is required")?;

    let config = StoredConfig {
        environment,
        client_id: Some(client_id),
        client_secret: Some(client_secret),
        simulated: !args.live,
    };

    let path = storage::save_config(&config).context("Failed to save config")?;

    output::success("Configuration saved");
    output::field("Path", &path.display().to_string());
    output::field("Environment", environment.as_str());
    output::field("Orders", if config.simulated { "simulated" } else { "live" });

    Ok(())
}
