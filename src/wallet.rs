//! In-memory wallet: the coins this user controls and their secrets.
//!
//! Serialized as a JSON object mapping the decimal coin id to the hex secret,
//! e.g. `{"7":"1f1f..."}`. Every secret is validated as a secp256k1 scalar
//! when the wallet is parsed, not on first use.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KeyPair;
use crate::error::{WalletError, WalletResult};

/// Ledger-assigned coin identifier.
pub type CoinId = u64;

/// Hex-encoded private key of a coin, checked to be a valid secp256k1 scalar.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CoinSecret(String);

impl CoinSecret {
    /// Validate and wrap a secret. Surrounding whitespace is dropped.
    pub fn parse(raw: &str) -> WalletResult<Self> {
        let secret = raw.trim();
        KeyPair::from_secret_hex(secret)?;
        Ok(Self(secret.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn key_pair(&self) -> WalletResult<KeyPair> {
        KeyPair::from_secret_hex(&self.0)
    }
}

impl std::fmt::Debug for CoinSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CoinSecret(<redacted>)")
    }
}

impl Serialize for CoinSecret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CoinSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = String::deserialize(deserializer)?;
        let parsed = Self::parse(&raw).map_err(serde::de::Error::custom);
        raw.zeroize();
        parsed
    }
}

/// Mapping from coin id to secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet {
    coins: BTreeMap<CoinId, CoinSecret>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the serialized mapping.
    pub fn parse(raw: &[u8]) -> WalletResult<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Serialize to the compact JSON mapping.
    pub fn serialize(&self) -> WalletResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn contains(&self, id: CoinId) -> bool {
        self.coins.contains_key(&id)
    }

    /// Coin ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CoinId> + '_ {
        self.coins.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoinId, &CoinSecret)> + '_ {
        self.coins.iter().map(|(id, secret)| (*id, secret))
    }

    pub fn get(&self, id: CoinId) -> WalletResult<&CoinSecret> {
        self.coins.get(&id).ok_or(WalletError::CoinMissing(id))
    }

    /// Insert a new coin; an id already present is rejected.
    pub fn add(&mut self, id: CoinId, secret: CoinSecret) -> WalletResult<()> {
        if self.coins.contains_key(&id) {
            return Err(WalletError::CoinExists(id));
        }
        self.coins.insert(id, secret);
        Ok(())
    }

    pub fn remove(&mut self, id: CoinId) -> WalletResult<CoinSecret> {
        self.coins.remove(&id).ok_or(WalletError::CoinMissing(id))
    }

    /// Point `to` at the secret of `from`. A `to` already present is rejected
    /// so no secret is ever replaced.
    pub fn alias(&mut self, from: CoinId, to: CoinId) -> WalletResult<()> {
        let secret = self.get(from)?.clone();
        self.add(to, secret)
    }

    /// Drop every coin; secrets are zeroized as they are dropped.
    pub fn clear(&mut self) {
        self.coins.clear();
    }
}
