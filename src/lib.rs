pub mod commands;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod prompt;
pub mod session;
pub mod wallet;

pub use commands::CommandRunner;
pub use config::AppConfig;
pub use error::{WalletError, WalletResult};
pub use wallet::{CoinId, CoinSecret, Wallet};
