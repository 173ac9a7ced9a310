use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;
use zeroize::Zeroizing;

use super::CommandRunner;
use crate::crypto::KeyPair;
use crate::error::{WalletError, WalletResult};
use crate::ledger::Ledger;
use crate::prompt::Prompt;
use crate::wallet::{CoinId, CoinSecret};

/// Coin id encoded in a coin file name: the leading digits before the first `.`.
pub fn coin_id_from_path(path: &Path) -> WalletResult<CoinId> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();

    digits
        .parse()
        .map_err(|_| WalletError::InvalidCoinFile(name.clone()))
}

fn round_clc(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl<L, P, W> CommandRunner<L, P, W>
where
    L: Ledger,
    P: Prompt,
    W: Write,
{
    /// Sum the ledger value of every coin in the wallet.
    pub async fn balance(&mut self) -> WalletResult<f64> {
        let session = self.sessions.open()?;
        let ids: Vec<CoinId> = session.wallet().ids().collect();

        let mut total = 0.0;
        for id in ids {
            total += self.ledger.coin(id).await?.val;
        }

        let total = round_clc(total);
        writeln!(self.out, "Total wallet balance {}CLC", total)?;
        Ok(total)
    }

    /// List coins with their public keys, optionally with value and ownership check.
    pub async fn coins(&mut self, validate: bool, show_value: bool) -> WalletResult<()> {
        let session = self.sessions.open()?;
        writeln!(self.out, "Wallet contains {} coins,", session.wallet().len())?;

        for (id, secret) in session.wallet().iter() {
            let public = secret.key_pair()?.public_hex();

            let mut coin = if show_value {
                Some(self.ledger.coin(id).await?)
            } else {
                None
            };

            match &coin {
                Some(c) => writeln!(self.out, "#{}, {}, {}CLC", id, public, c.val)?,
                None => writeln!(self.out, "#{}, {}", id, public)?,
            }

            if validate {
                let coin = match coin.take() {
                    Some(c) => c,
                    None => self.ledger.coin(id).await?,
                };
                if coin.is_held_by(&public) {
                    writeln!(self.out, "Valid.")?;
                } else {
                    warn!("Coin #{} is not held by its wallet key", id);
                    writeln!(self.out, "Invalid!")?;
                }
            }
        }

        Ok(())
    }

    /// Remove a coin, asking for the id again unless `confirmed`.
    pub fn delete(&mut self, id: CoinId, confirmed: bool) -> WalletResult<()> {
        let mut session = self.sessions.open()?;
        session.wallet().get(id)?;

        if !confirmed {
            let typed = self
                .prompt
                .input("Please retype the coin id you want to delete >")?;
            if typed.trim().parse::<CoinId>().ok() != Some(id) {
                return Err(WalletError::ConfirmationMismatch);
            }
            writeln!(self.out, "Confirmed.")?;
        }

        session.wallet_mut().remove(id)?;
        self.sessions.commit(&mut session)?;
        writeln!(self.out, "Done.")?;
        Ok(())
    }

    /// Import a coin file; its name carries the id, its content the secret.
    pub async fn add(&mut self, path: &Path, validate: bool) -> WalletResult<CoinId> {
        let mut session = self.sessions.open()?;
        let id = coin_id_from_path(path)?;
        if session.wallet().contains(id) {
            return Err(WalletError::CoinExists(id));
        }

        let raw = Zeroizing::new(fs::read_to_string(path)?);
        let secret = CoinSecret::parse(&raw)?;

        if validate {
            let public = secret.key_pair()?.public_hex();
            let coin = self.ledger.coin(id).await?;
            if !coin.is_held_by(&public) {
                warn!("Refusing to add coin #{}: holder mismatch", id);
                return Err(WalletError::NotHolder(id));
            }
            writeln!(self.out, "Valid coin, adding...")?;
        }

        session.wallet_mut().add(id, secret)?;
        self.sessions.commit(&mut session)?;
        writeln!(self.out, "Done.")?;
        Ok(id)
    }

    /// Print the stored secret of a coin.
    pub fn private(&mut self, id: CoinId) -> WalletResult<()> {
        let session = self.sessions.open()?;
        let secret = session.wallet().get(id)?;
        writeln!(self.out, "{}", secret.expose())?;
        Ok(())
    }

    /// Print a key pair: derived from `private` when given, fresh otherwise.
    /// Works without a session.
    pub fn keys(&mut self, private: Option<&str>) -> WalletResult<()> {
        let keypair = match private {
            Some(secret) => KeyPair::from_secret_hex(secret)?,
            None => KeyPair::generate(),
        };
        writeln!(self.out, "Private: {}", keypair.private_hex().as_str())?;
        writeln!(self.out, "Public: {}", keypair.public_hex())?;
        Ok(())
    }
}
