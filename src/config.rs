use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::crypto::WalletFormat;

/// File name of the plaintext session, placed in the user's home directory.
pub const SESSION_FILE_NAME: &str = ".clc-cold-ses";

/// Ledger service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Base URL of the ledger HTTP API
    #[serde(default = "default_ledger_url")]
    pub url: String,
    /// Request timeout; unset means requests wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_ledger_url() -> String {
    "https://clc.ix.tc".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            url: default_ledger_url(),
            timeout_secs: None,
        }
    }
}

/// Helper to get ledger URLs with proper trailing slash handling
impl LedgerConfig {
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

/// Session file configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// Override for the session file location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolve the session path, falling back to `~/.clc-cold-ses`.
    pub fn resolve_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(SESSION_FILE_NAME))
            .ok_or_else(|| ConfigError::Message("could not find home directory".to_string()))
    }
}

/// Wallet file settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WalletConfig {
    /// Envelope written by `logout`
    #[serde(default)]
    pub format: WalletFormat,
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

impl AppConfig {
    /// Load configuration from the user config file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Optional per-user config file, e.g. ~/.config/clc-cold-wallet/config.toml
        if let Some(dir) = dirs::config_dir() {
            let base = dir.join("clc-cold-wallet").join("config");
            builder = builder.add_source(File::with_name(&base.to_string_lossy()).required(false));
        }

        let config = builder
            // Override with environment variables (prefix: CLC_COLD_)
            // e.g., CLC_COLD_LEDGER__URL, CLC_COLD_WALLET__FORMAT
            .add_source(
                Environment::with_prefix("CLC_COLD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_endpoint() {
        let config = LedgerConfig {
            url: "https://clc.ix.tc/".to_string(),
            timeout_secs: None,
        };
        assert_eq!(config.endpoint("/coin/4"), "https://clc.ix.tc/coin/4");
        assert_eq!(config.endpoint("ledger-length"), "https://clc.ix.tc/ledger-length");
    }

    #[test]
    fn test_session_path_override() {
        let config = SessionConfig {
            path: Some(PathBuf::from("/tmp/custom-ses")),
        };
        assert_eq!(config.resolve_path().unwrap(), PathBuf::from("/tmp/custom-ses"));
    }

    #[test]
    fn test_defaults_from_empty_source() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.ledger.url, "https://clc.ix.tc");
        assert!(config.ledger.timeout_secs.is_none());
        assert_eq!(config.wallet.format, WalletFormat::Legacy);
    }
}
