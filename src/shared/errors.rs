//! Error handling for the application

use thiserror::Error;

/// Wallet connection errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    /// User declined the request in the wallet UI. Expected and frequent,
    /// never logged as an error and never surfaced as a visible message.
    #[error("User rejected the request")]
    UserRejected,

    #[error("No installed provider matches wallet '{0}'")]
    ProviderNotFound(String),

    #[error("Another connection is in progress")]
    AlreadyConnecting,

    #[error("Connection attempt timed out after {0}s")]
    ConnectionTimeout(u64),

    #[error("No accounts returned by provider")]
    NoAccounts,

    #[error("Wallet error: {0}")]
    Unknown(String),
}

/// Quote aggregation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("Invalid input amount: {0}")]
    InvalidAmount(String),

    #[error("No valid routes found")]
    NoValidRoutes,

    #[error("Source {0} failed: {1}")]
    SourceFailed(String, String),
}

/// Execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Signer required for transaction execution")]
    NoSigner,

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction confirmation timed out")]
    ConfirmationTimeout,
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Whether the failure should be shown to the user.
    ///
    /// User rejection is a silent cancellation; everything else produces a
    /// transient message.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AppError::Wallet(WalletError::UserRejected))
    }
}
