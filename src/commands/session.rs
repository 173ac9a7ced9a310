use serde::de::IgnoredAny;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::CommandRunner;
use crate::crypto::{self, WalletFormat};
use crate::error::{WalletError, WalletResult};
use crate::ledger::Ledger;
use crate::prompt::Prompt;
use crate::wallet::Wallet;

impl<L, P, W> CommandRunner<L, P, W>
where
    L: Ledger,
    P: Prompt,
    W: Write,
{
    /// Decrypt the wallet file at `path` and open a session for it.
    pub fn decrypt(&mut self, path: &Path, print: bool) -> WalletResult<()> {
        self.ensure_no_session()?;

        let token = fs::read_to_string(path)?;
        let password = self.prompt.password("Enter wallet encryption password >")?;
        let plaintext = crypto::decrypt(&token, &password)?;

        // Legacy files decrypt to garbage under a wrong password; anything
        // that is not a JSON object is treated as such.
        if plaintext.first() != Some(&b'{')
            || serde_json::from_slice::<IgnoredAny>(&plaintext).is_err()
        {
            debug!("Decrypted payload of {} is not a wallet", path.display());
            return Err(WalletError::InvalidPassword);
        }
        let wallet = Wallet::parse(&plaintext)?;

        writeln!(self.out, "Wallet contains {} coins.", wallet.len())?;
        if print {
            writeln!(self.out, "{}", serde_json::to_string_pretty(&wallet)?)?;
        }

        self.sessions.create(&wallet)?;
        info!("Wallet {} loaded", path.display());
        Ok(())
    }

    /// Encrypt the open session into `path` and end the session.
    ///
    /// `format` overrides the runner's configured envelope.
    pub fn logout(&mut self, path: &Path, format: Option<WalletFormat>) -> WalletResult<()> {
        let session = self.sessions.open()?;

        let password = self.prompt.password("Enter wallet encryption password >")?;
        let confirm = self.prompt.password("Retype wallet encryption password >")?;
        if *password != *confirm {
            return Err(WalletError::PasswordMismatch);
        }

        let contents = Zeroizing::new(session.wallet().serialize()?);
        let token = crypto::encrypt(&contents, &password, format.unwrap_or(self.format))?;
        fs::write(path, token)?;
        self.sessions.close(session)?;

        writeln!(
            self.out,
            "Successfully saved and encrypted wallet to {}!",
            path.display()
        )?;
        Ok(())
    }
}
