/// Domain-specific error types for the auction client.
#[derive(Debug, thiserror::Error)]
pub enum AuctionError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Ledger operation failed: {0}")]
    Ledger(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No active bids to process")]
    NoActiveBids,

    #[error("Bid index update conflicted after {attempts} attempts")]
    IndexConflict { attempts: u32 },

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias.
pub type AuctionResult<T> = Result<T, AuctionError>;
