use crate::wallet::CoinId;
use thiserror::Error;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Remote(String),

    #[error("Wallet not loaded yet, please decrypt")]
    NotLoaded,

    #[error("Wallet already loaded, please logout")]
    AlreadyLoaded,

    #[error("Coin #{0} is not in this wallet")]
    CoinMissing(CoinId),

    #[error("Coin #{0} is already in this wallet")]
    CoinExists(CoinId),

    #[error("Invalid coin file name: {0}")]
    InvalidCoinFile(String),

    #[error("Invalid coin! #{0} is held by another key")]
    NotHolder(CoinId),

    #[error("Invalid password!")]
    InvalidPassword,

    #[error("Passwords don't match!")]
    PasswordMismatch,

    #[error("Aborting!")]
    ConfirmationMismatch,

    #[error("Invalid private key: {0}")]
    InvalidSecret(String),

    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

/// Coarse classification used when reporting a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    Authentication,
    Confirmation,
    Remote,
    Transport,
    Local,
}

impl WalletError {
    pub fn crypto<S: Into<String>>(msg: S) -> Self {
        Self::Crypto(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotLoaded
            | Self::AlreadyLoaded
            | Self::CoinMissing(_)
            | Self::CoinExists(_)
            | Self::InvalidCoinFile(_)
            | Self::NotHolder(_)
            | Self::InvalidSecret(_)
            | Self::InvalidVolume(_) => ErrorKind::Precondition,
            Self::InvalidPassword => ErrorKind::Authentication,
            Self::PasswordMismatch | Self::ConfirmationMismatch => ErrorKind::Confirmation,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Http(_) | Self::MalformedResponse(_) => ErrorKind::Transport,
            Self::Config(_) | Self::Io(_) | Self::Json(_) | Self::Crypto(_) => ErrorKind::Local,
        }
    }
}

/// Result type alias using WalletError
pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_verbatim() {
        let err = WalletError::Remote("Invalid signature".to_string());
        assert_eq!(err.to_string(), "Invalid signature");
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn kinds_follow_failure_classes() {
        assert_eq!(WalletError::NotLoaded.kind(), ErrorKind::Precondition);
        assert_eq!(WalletError::CoinMissing(4).kind(), ErrorKind::Precondition);
        assert_eq!(WalletError::InvalidPassword.kind(), ErrorKind::Authentication);
        assert_eq!(WalletError::ConfirmationMismatch.kind(), ErrorKind::Confirmation);
        assert_eq!(WalletError::malformed("missing coin").kind(), ErrorKind::Transport);
    }
}
