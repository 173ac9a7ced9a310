//! Wallet commands.
//!
//! A [`CommandRunner`] owns everything a command touches: the session file,
//! the ledger, the interactive prompt and the console. Each command is one
//! method; failures come back as [`WalletError`](crate::error::WalletError)
//! and leave the session exactly as it was before the failing step.

mod inventory;
mod session;
mod transfer;

use std::io::Write;

use crate::crypto::WalletFormat;
use crate::error::{WalletError, WalletResult};
use crate::ledger::Ledger;
use crate::prompt::Prompt;
use crate::session::SessionStore;

pub use inventory::coin_id_from_path;
pub use transfer::parse_volume;

pub struct CommandRunner<L, P, W> {
    sessions: SessionStore,
    ledger: L,
    prompt: P,
    out: W,
    format: WalletFormat,
}

impl<L, P, W> CommandRunner<L, P, W>
where
    L: Ledger,
    P: Prompt,
    W: Write,
{
    pub fn new(sessions: SessionStore, ledger: L, prompt: P, out: W) -> Self {
        Self {
            sessions,
            ledger,
            prompt,
            out,
            format: WalletFormat::default(),
        }
    }

    /// Envelope used when `logout` writes the wallet file.
    pub fn with_format(mut self, format: WalletFormat) -> Self {
        self.format = format;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn ensure_no_session(&self) -> WalletResult<()> {
        if self.sessions.exists() {
            return Err(WalletError::AlreadyLoaded);
        }
        Ok(())
    }
}
