//! CLI argument definitions.

use clap::{Args, Parser};

use crate::commands::Commands;

/// Command-line client for the Deribit API.
#[derive(Parser, Debug)]
#[command(name = "deribit-cli")]
#[command(author, version = env!("DERIBIT_CLI_VERSION"), about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Environment to use: test or prod (overrides the stored config)
    #[arg(long = "env", env = "DERIBIT_ENV", global = true)]
    pub environment: Option<String>,

    /// Base URL override, e.g. a local mock server
    #[arg(long, env = "DERIBIT_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API client id (overrides the stored config)
    #[arg(long, env = "DERIBIT_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    /// API client secret (overrides the stored config)
    #[arg(long, env = "DERIBIT_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,
}
