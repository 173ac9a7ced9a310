//! Remote ledger: the service of record for coin ownership and value.
//!
//! Every endpoint answers with a JSON object. An `error` field means the
//! ledger refused the request; its text is surfaced to the user verbatim.

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::WalletResult;
use crate::wallet::CoinId;

pub use client::HttpLedger;

/// One entry of a coin's transfer history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transfer {
    /// Uncompressed public key (hex) of the holder after this transfer
    pub holder: String,
}

/// A coin as recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Coin {
    pub val: f64,
    #[serde(default)]
    pub transactions: Vec<Transfer>,
}

impl Coin {
    /// Holder recorded by the most recent transfer.
    pub fn current_holder(&self) -> Option<&str> {
        self.transactions.last().map(|t| t.holder.as_str())
    }

    /// True when the most recent transfer names `public_key` as the holder.
    pub fn is_held_by(&self, public_key: &str) -> bool {
        self.current_holder() == Some(public_key)
    }
}

/// Move a whole coin to a new holder.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactRequest {
    pub coin: CoinId,
    pub new_holder: String,
    pub signature: String,
}

/// Move `volume` from `origin` into the existing coin `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequest {
    pub origin: CoinId,
    pub target: CoinId,
    pub volume: String,
    pub signature: String,
}

/// Split `volume` off `origin` into the new coin `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRequest {
    pub origin: CoinId,
    pub target: CoinId,
    pub volume: String,
    pub signature: String,
}

/// Operations the wallet needs from the ledger.
///
/// Each call resolves to the parsed payload, `WalletError::Remote` when the
/// ledger answered with an `error`, or a transport error.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn coin(&self, id: CoinId) -> WalletResult<Coin>;

    /// Number of coins the ledger has issued; the next new coin gets `length + 1`.
    async fn ledger_length(&self) -> WalletResult<u64>;

    async fn transact(&self, request: &TransactRequest) -> WalletResult<()>;

    async fn merge(&self, request: &MergeRequest) -> WalletResult<()>;

    async fn split(&self, request: &SplitRequest) -> WalletResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_parses_ledger_payload() {
        let coin: Coin = serde_json::from_str(
            r#"{"val":1.25,"transactions":[{"holder":"04aa","sign":"30"},{"holder":"04bb"}]}"#,
        )
        .unwrap();
        assert_eq!(coin.val, 1.25);
        assert_eq!(coin.current_holder(), Some("04bb"));
        assert!(coin.is_held_by("04bb"));
        assert!(!coin.is_held_by("04aa"));
    }

    #[test]
    fn coin_without_history_has_no_holder() {
        let coin: Coin = serde_json::from_str(r#"{"val":3}"#).unwrap();
        assert!(coin.current_holder().is_none());
        assert!(!coin.is_held_by("04aa"));
    }
}
