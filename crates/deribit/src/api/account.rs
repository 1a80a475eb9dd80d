//! Private account queries.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use crate::DeribitClient;
use crate::error::Error;
use crate::rpc::endpoints::{
    GET_ACCOUNT_SUMMARY, GET_PORTFOLIO_MARGINS, GET_POSITIONS, GET_SUBACCOUNTS,
    GET_TRANSACTION_LOG, LIST_API_KEYS,
};
use crate::types::InstrumentKind;
use crate::types::instrument::base_currency;

use super::{field, into_array};

impl DeribitClient {
    /// Extended account summary for `currency`.
    #[instrument(skip(self))]
    pub async fn get_account_summary(&self, currency: &str) -> Result<Value, Error> {
        let params = json!({"currency": currency, "extended": true});
        self.request(GET_ACCOUNT_SUMMARY, params).await
    }

    #[instrument(skip(self))]
    pub async fn get_positions(
        &self,
        currency: &str,
        kind: Option<InstrumentKind>,
    ) -> Result<Vec<Value>, Error> {
        let mut params = json!({"currency": currency});
        if let Some(kind) = kind {
            params["kind"] = json!(kind);
        }
        into_array(self.request(GET_POSITIONS, params).await?)
    }

    /// Transaction log entries between `start` and `end`.
    ///
    /// Follows the `continuation` cursor until the server reports no more
    /// pages. A cursor that was already followed ends the walk. `query`
    /// filters by entry type (`"trade"`, `"delivery"`, ...).
    #[instrument(skip(self))]
    pub async fn get_transaction_log(
        &self,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        query: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        let mut params = json!({
            "currency": currency,
            "start_timestamp": start.timestamp_millis(),
            "end_timestamp": end.timestamp_millis(),
        });
        if let Some(query) = query {
            params["query"] = json!(query);
        }

        let mut logs = Vec::new();
        let mut followed = HashSet::new();
        let mut pages = 0usize;
        loop {
            let page = self.request(GET_TRANSACTION_LOG, params.clone()).await?;
            logs.extend(into_array(field(&page, "logs")?.clone())?);
            pages += 1;

            let next = match page.get("continuation") {
                Some(next) if !next.is_null() => next,
                _ => break,
            };
            if !followed.insert(next.to_string()) {
                warn!(continuation = %next, "Continuation repeated, stopping");
                break;
            }
            params["continuation"] = next.clone();
        }

        debug!(pages, entries = logs.len(), "Transaction log loaded");
        Ok(logs)
    }

    /// Settlement and delivery entries.
    pub async fn get_delivery_log(
        &self,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Value>, Error> {
        self.get_transaction_log(currency, start, end, Some("delivery"))
            .await
    }

    /// Deposits followed by transfers.
    pub async fn get_flow_history(
        &self,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Value>, Error> {
        let mut flows = Vec::new();
        for query in ["deposit", "transfer"] {
            flows.extend(
                self.get_transaction_log(currency, start, end, Some(query))
                    .await?,
            );
        }
        Ok(flows)
    }

    /// Margins for a set of hypothetical positions.
    ///
    /// Positions are grouped by base currency and one request is made per
    /// currency; the result is keyed by currency.
    pub async fn get_portfolio_margins(
        &self,
        positions: &[(String, f64)],
        add_positions: bool,
    ) -> Result<BTreeMap<String, Value>, Error> {
        let mut margins = BTreeMap::new();
        for (currency, simulated) in group_by_currency(positions) {
            let params = json!({
                "currency": currency,
                "simulated_positions": simulated,
                "add_positions": add_positions,
            });
            let result = self.request(GET_PORTFOLIO_MARGINS, params).await?;
            margins.insert(currency, result);
        }
        Ok(margins)
    }

    #[instrument(skip(self))]
    pub async fn get_subaccounts(&self, with_portfolio: bool) -> Result<Vec<Value>, Error> {
        let params = json!({"with_portfolio": with_portfolio});
        into_array(self.request(GET_SUBACCOUNTS, params).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_api_keys(&self) -> Result<Vec<Value>, Error> {
        into_array(self.request(LIST_API_KEYS, json!({})).await?)
    }
}

fn group_by_currency(positions: &[(String, f64)]) -> BTreeMap<String, Map<String, Value>> {
    let mut grouped: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for (name, amount) in positions {
        grouped
            .entry(base_currency(name).to_string())
            .or_default()
            .insert(name.clone(), json!(amount));
    }
    grouped
}
