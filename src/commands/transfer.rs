use std::io::Write;
use tracing::{info, warn};

use super::CommandRunner;
use crate::error::{WalletError, WalletResult};
use crate::ledger::{Ledger, MergeRequest, SplitRequest, TransactRequest};
use crate::prompt::Prompt;
use crate::wallet::CoinId;

/// Check a volume argument. The text itself is what gets signed and sent,
/// so it is returned unchanged.
pub fn parse_volume(volume: &str) -> WalletResult<String> {
    match volume.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(volume.to_string()),
        _ => Err(WalletError::InvalidVolume(volume.to_string())),
    }
}

/// Payload signed for a merge: `"{target} {target tx count} {volume}"`.
fn merge_payload(target: CoinId, target_transactions: usize, volume: &str) -> String {
    format!("{} {} {}", target, target_transactions, volume)
}

/// Payload signed for a split: `"{new id} 1 {volume}"`.
fn split_payload(new_id: CoinId, volume: &str) -> String {
    format!("{} 1 {}", new_id, volume)
}

impl<L, P, W> CommandRunner<L, P, W>
where
    L: Ledger,
    P: Prompt,
    W: Write,
{
    /// Hand coin `id` to `address`; the coin leaves the wallet once the ledger accepts.
    pub async fn transact(&mut self, id: CoinId, address: &str) -> WalletResult<()> {
        let mut session = self.sessions.open()?;
        let key = session.wallet().get(id)?.key_pair()?;

        let signature = key.sign_message(address)?;
        writeln!(
            self.out,
            "Generated signature for transaction to {},\n{}, transacting...",
            address, signature
        )?;

        self.ledger
            .transact(&TransactRequest {
                coin: id,
                new_holder: address.to_string(),
                signature,
            })
            .await?;

        session.wallet_mut().remove(id)?;
        self.sessions.commit(&mut session)?;
        info!("Coin #{} transferred", id);
        writeln!(self.out, "Done, deleted from wallet!")?;
        Ok(())
    }

    /// Merge `volume` of coin `id` into coin `target`. The wallet is not changed.
    pub async fn merge(&mut self, id: CoinId, target: CoinId, volume: &str) -> WalletResult<()> {
        let session = self.sessions.open()?;
        let key = session.wallet().get(id)?.key_pair()?;
        let volume = parse_volume(volume)?;

        writeln!(self.out, "Fetching data...")?;
        let target_coin = self.ledger.coin(target).await?;
        let signature =
            key.sign_message(&merge_payload(target, target_coin.transactions.len(), &volume))?;

        writeln!(self.out, "Merging...")?;
        self.ledger
            .merge(&MergeRequest {
                origin: id,
                target,
                volume,
                signature,
            })
            .await?;

        info!("Merged coin #{} into #{}", id, target);
        writeln!(self.out, "Done!")?;
        Ok(())
    }

    /// Split `volume` off coin `id` into a new coin sharing the same key.
    pub async fn split(&mut self, id: CoinId, volume: &str) -> WalletResult<CoinId> {
        let mut session = self.sessions.open()?;
        let key = session.wallet().get(id)?.key_pair()?;
        let volume = parse_volume(volume)?;

        writeln!(self.out, "Fetching data...")?;
        let new_id = self
            .ledger
            .ledger_length()
            .await?
            .checked_add(1)
            .ok_or_else(|| WalletError::malformed("ledger-length has no successor id"))?;
        if session.wallet().contains(new_id) {
            warn!("Refusing to split coin #{}: #{} is already in the wallet", id, new_id);
            return Err(WalletError::CoinExists(new_id));
        }
        let signature = key.sign_message(&split_payload(new_id, &volume))?;

        writeln!(self.out, "Splitting...")?;
        self.ledger
            .split(&SplitRequest {
                origin: id,
                target: new_id,
                volume,
                signature,
            })
            .await?;

        session.wallet_mut().alias(id, new_id)?;
        self.sessions.commit(&mut session)?;
        info!("Split coin #{} into #{}", id, new_id);
        writeln!(self.out, "New id, #{}", new_id)?;
        writeln!(self.out, "Done!")?;
        Ok(new_id)
    }
}
