//! The unlocked wallet, kept as a plaintext file between invocations.
//!
//! At most one session exists at a time: `decrypt` creates it, `logout`
//! removes it, and every other wallet command loads it, mutates the
//! in-memory [`Session`] and commits it back when something changed.
//! The file is not locked; two invocations racing on it can lose writes.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};
use crate::wallet::Wallet;

/// Raw access to the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a session file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the raw session bytes; a missing file is [`WalletError::NotLoaded`].
    pub fn load(&self) -> WalletResult<Zeroizing<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Zeroizing::new(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(WalletError::NotLoaded),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the session file with `data`.
    ///
    /// Writes a sibling temp file readable only by the owner, then renames it
    /// over the session path.
    pub fn save(&self, data: &[u8]) -> WalletResult<()> {
        let tmp_path = self.tmp_path();

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
        }

        #[cfg(not(unix))]
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        debug!("Session written to {}", self.path.display());
        Ok(())
    }

    /// Remove the session file. An already missing file is not an error.
    pub fn delete(&self) -> WalletResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Start a session for `wallet`; fails if one is already open.
    pub fn create(&self, wallet: &Wallet) -> WalletResult<()> {
        if self.exists() {
            return Err(WalletError::AlreadyLoaded);
        }
        let data = Zeroizing::new(wallet.serialize()?);
        self.save(&data)?;
        info!("Session created at {} with {} coins", self.path.display(), wallet.len());
        Ok(())
    }

    /// Load the open session.
    pub fn open(&self) -> WalletResult<Session> {
        let data = self.load()?;
        let wallet = Wallet::parse(&data)?;
        Ok(Session {
            wallet,
            dirty: false,
        })
    }

    /// Persist the session if any command mutated it.
    pub fn commit(&self, session: &mut Session) -> WalletResult<()> {
        if !session.dirty {
            return Ok(());
        }
        let data = Zeroizing::new(session.wallet.serialize()?);
        self.save(&data)?;
        session.dirty = false;
        Ok(())
    }

    /// End the session: the file is removed and the wallet cleared.
    pub fn close(&self, mut session: Session) -> WalletResult<()> {
        self.delete()?;
        session.wallet.clear();
        info!("Session at {} closed", self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Handle to the unlocked wallet for the duration of one command.
#[derive(Debug)]
pub struct Session {
    wallet: Wallet,
    dirty: bool,
}

impl Session {
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Mutable access; marks the session for [`SessionStore::commit`].
    pub fn wallet_mut(&mut self) -> &mut Wallet {
        self.dirty = true;
        &mut self.wallet
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
