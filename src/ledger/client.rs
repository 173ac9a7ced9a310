use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Coin, Ledger, MergeRequest, SplitRequest, TransactRequest};
use crate::config::LedgerConfig;
use crate::error::{WalletError, WalletResult};
use crate::wallet::CoinId;

/// Response of `GET /coin/{id}`
#[derive(Debug, Deserialize)]
struct CoinResponse {
    coin: Coin,
}

/// Response of `GET /ledger-length`
#[derive(Debug, Deserialize)]
struct LengthResponse {
    length: u64,
}

/// Response of the state-changing endpoints, which carry nothing on success
#[derive(Debug, Deserialize)]
struct Accepted {}

/// Client for the ledger's HTTP API
pub struct HttpLedger {
    http: Client,
    config: LedgerConfig,
}

impl std::fmt::Debug for HttpLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLedger")
            .field("base_url", &self.config.url)
            .finish_non_exhaustive()
    }
}

impl HttpLedger {
    /// Create a new ledger client from config
    pub fn new(config: &LedgerConfig) -> WalletResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            config: config.clone(),
        })
    }

    /// Issue a GET and interpret the ledger's response contract.
    ///
    /// A set `error` field becomes [`WalletError::Remote`]. Without one, a
    /// non-2xx status is a malformed response; otherwise the body is decoded as `T`.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> WalletResult<T> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            warn!("Ledger returned non-JSON body with status {}", status);
            WalletError::malformed(format!("{} returned {}: {}", path, status, e))
        })?;

        if let Some(message) = value.get("error").and_then(refusal_message) {
            warn!("Ledger rejected {}: {}", path, message);
            return Err(WalletError::Remote(message));
        }

        if !status.is_success() {
            warn!("Ledger answered {} with status {}", path, status);
            return Err(WalletError::malformed(format!("{} returned {}", path, status)));
        }

        serde_json::from_value(value)
            .map_err(|e| WalletError::malformed(format!("{}: {}", path, e)))
    }
}

/// Text of an `error` field that signals a refusal.
///
/// Falsy values (`null`, `false`, `0`, `""`) mean the request succeeded.
fn refusal_message(error: &Value) -> Option<String> {
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Ledger for HttpLedger {
    async fn coin(&self, id: CoinId) -> WalletResult<Coin> {
        let response: CoinResponse = self.get(&format!("coin/{}", id), &[]).await?;
        Ok(response.coin)
    }

    async fn ledger_length(&self) -> WalletResult<u64> {
        let response: LengthResponse = self.get("ledger-length", &[]).await?;
        Ok(response.length)
    }

    async fn transact(&self, request: &TransactRequest) -> WalletResult<()> {
        let query = [
            ("cid", request.coin.to_string()),
            ("newholder", request.new_holder.clone()),
            ("sign", request.signature.clone()),
        ];
        let _: Accepted = self.get("transaction", &query).await?;
        Ok(())
    }

    async fn merge(&self, request: &MergeRequest) -> WalletResult<()> {
        let query = [
            ("origin", request.origin.to_string()),
            ("sign", request.signature.clone()),
            ("target", request.target.to_string()),
            ("vol", request.volume.clone()),
        ];
        let _: Accepted = self.get("merge", &query).await?;
        Ok(())
    }

    async fn split(&self, request: &SplitRequest) -> WalletResult<()> {
        let query = [
            ("origin", request.origin.to_string()),
            ("sign", request.signature.clone()),
            ("target", request.target.to_string()),
            ("vol", request.volume.clone()),
        ];
        let _: Accepted = self.get("split", &query).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_error_fields_are_not_refusals() {
        assert_eq!(refusal_message(&json!(null)), None);
        assert_eq!(refusal_message(&json!(false)), None);
        assert_eq!(refusal_message(&json!(0)), None);
        assert_eq!(refusal_message(&json!("")), None);
        assert_eq!(
            refusal_message(&json!("Invalid signature")),
            Some("Invalid signature".to_string())
        );
        assert_eq!(refusal_message(&json!(true)), Some("true".to_string()));
        assert_eq!(refusal_message(&json!(3)), Some("3".to_string()));
    }

    #[test]
    fn test_client_debug_hides_internals() {
        let ledger = HttpLedger::new(&LedgerConfig::default()).unwrap();
        let debug = format!("{:?}", ledger);
        assert!(debug.contains("https://clc.ix.tc"));
    }
}
