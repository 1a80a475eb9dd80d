//! Server time, status and version.

use serde_json::{Value, json};
use tracing::instrument;

use crate::DeribitClient;
use crate::error::Error;
use crate::rpc::endpoints::{GET_TIME, STATUS, TEST};

use super::{field, into_array, str_field};

impl DeribitClient {
    /// Server time in milliseconds since the Unix epoch.
    #[instrument(skip(self))]
    pub async fn get_time(&self) -> Result<i64, Error> {
        let result = self.request(GET_TIME, json!({})).await?;
        result.as_i64().ok_or_else(|| Error::Decode {
            message: "server time is not an integer".to_string(),
        })
    }

    /// Platform lock status.
    #[instrument(skip(self))]
    pub async fn get_status(&self) -> Result<Value, Error> {
        self.request(STATUS, json!({})).await
    }

    /// Currencies currently locked, if the platform reports any.
    pub async fn get_locked_currencies(&self) -> Result<Vec<String>, Error> {
        let status = self.get_status().await?;
        string_list(&status, "locked_currencies")
    }

    /// Indices currently locked.
    pub async fn get_locked_indices(&self) -> Result<Vec<String>, Error> {
        let status = self.get_status().await?;
        string_list(&status, "locked_indices")
    }

    /// Connectivity check; the result carries the API version.
    #[instrument(skip(self))]
    pub async fn test(&self) -> Result<Value, Error> {
        self.request(TEST, json!({})).await
    }

    pub async fn get_api_version(&self) -> Result<String, Error> {
        let result = self.test().await?;
        Ok(str_field(&result, "version")?.to_string())
    }
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>, Error> {
    if value.get(key).is_none() {
        return Ok(Vec::new());
    }
    into_array(field(value, key)?.clone())?
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(Error::Decode {
                message: format!("expected a string in `{}`, got {}", key, other),
            }),
        })
        .collect()
}
