//! Stored CLI configuration and client construction.

pub mod storage;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use deribit::{ApiUrl, ClientConfig, Credentials, DeribitClient, Environment};

use crate::cli::GlobalArgs;

/// Configuration persisted by `deribit-cli configure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_simulated")]
    pub simulated: bool,
}

fn default_simulated() -> bool {
    true
}

impl StoredConfig {
    /// Copy with the secret masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            client_secret: self.client_secret.as_ref().map(|_| "[REDACTED]".to_string()),
            ..self.clone()
        }
    }
}

/// Merge flags, environment variables and the stored config.
///
/// Flags win over the stored config. Orders stay simulated unless `live`
/// is set or the stored config disables simulation.
pub fn client_config(
    global: &GlobalArgs,
    stored: Option<&StoredConfig>,
    live: bool,
) -> Result<ClientConfig> {
    let environment = match &global.environment {
        Some(env) => env.parse::<Environment>().context("Invalid environment")?,
        None => stored.map(|s| s.environment).unwrap_or_default(),
    };

    let mut config = ClientConfig::new(environment)
        .simulated(!live && stored.is_none_or(|s| s.simulated));

    if let Some(base_url) = &global.base_url {
        config = config.with_base_url(ApiUrl::new(base_url).context("Invalid base URL")?);
    }

    let client_id = global
        .client_id
        .clone()
        .or_else(|| stored.and_then(|s| s.client_id.clone()));
    let client_secret = global
        .client_secret
        .clone()
        .or_else(|| stored.and_then(|s| s.client_secret.clone()));

    if let (Some(id), Some(secret)) = (client_id, client_secret) {
        config = config.with_credentials(Credentials::new(id, secret));
    }

    Ok(config)
}

/// Build a client from flags and the stored config.
pub fn client(global: &GlobalArgs, live: bool) -> Result<DeribitClient> {
    let stored = storage::load_config().context("Failed to load config")?;
    let config = client_config(global, stored.as_ref(), live)?;
    tracing::debug!(env = %config.environment, simulated = config.simulated, "Client configured");
    DeribitClient::new(config).context("Failed to create client")
}
