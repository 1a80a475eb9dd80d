//! Show-config command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::config::storage;
use crate::output;

#[derive(Args, Debug)]
pub struct ShowConfigArgs {}

pub fn run(_args: ShowConfigArgs, global: &GlobalArgs) -> Result<()> {
    let config = storage::load_config()
        .context("Failed to load config")?
        .context("No stored configuration. Run 'deribit-cli configure' first.")?;

    output::print(&config.redacted(), global.pretty)
}
