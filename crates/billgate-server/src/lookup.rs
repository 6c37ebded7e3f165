use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use billgate_core::billing::{BillingStatusLookup, BillingUserInfo, LookupError};
use billgate_core::error::CoreError;
use billgate_core::identity::AuthenticatedContext;

use crate::config::Config;

/// Error payload the backend returns on a failed RPC call.
#[derive(Debug, Default, Deserialize)]
struct RpcErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Calls the account backend's billing status RPC as the caller.
///
/// `POST {base}/rest/v1/rpc/{function}` with `{"account_id": ...}`, the project
/// key in `apikey` and the caller's token as the bearer.
pub struct RpcBillingStatusLookup {
    client: reqwest::Client,
    endpoint: String,
    anon_key: String,
}

impl RpcBillingStatusLookup {
    pub fn new(
        base_url: &str,
        anon_key: impl Into<String>,
        function: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/rpc/{}", base_url.trim_end_matches('/'), function),
            anon_key: anon_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.backend_url,
            config.backend_anon_key.clone(),
            &config.billing_status_rpc,
            config.lookup_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BillingStatusLookup for RpcBillingStatusLookup {
    async fn fetch_billing_status(
        &self,
        context: &AuthenticatedContext,
        account_id: &str,
    ) -> Result<BillingUserInfo, LookupError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(&context.access_token)
            .json(&json!({ "account_id": account_id }))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("billing status request failed: {e}"))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("billing status response unreadable: {e}"))?;

        if !status.is_success() {
            let payload: RpcErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            tracing::debug!(%status, code = ?payload.code, "Billing status lookup rejected");
            return Err(LookupError::Rejected {
                message: payload
                    .message
                    .unwrap_or_else(|| format!("backend returned {status}")),
                code: payload.code,
            });
        }

        parse_snapshot(&body)
    }
}

/// A JSON object is the snapshot; `null` or an empty array means no row.
/// Array results use their first row.
fn parse_snapshot(body: &[u8]) -> Result<BillingUserInfo, LookupError> {
    let value: Value = serde_json::from_slice(body).map_err(malformed)?;
    let row = match value {
        Value::Array(rows) => rows.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };
    if row.is_null() {
        return Err(LookupError::NotFound);
    }
    serde_json::from_value(row).map_err(malformed)
}

fn malformed(e: serde_json::Error) -> LookupError {
    LookupError::Transport(anyhow::Error::from(CoreError::from(e)))
}
