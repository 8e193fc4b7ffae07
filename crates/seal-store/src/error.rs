use std::path::PathBuf;

use seal_crypto::MinerError;

/// Errors from chain store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No chain has been persisted yet.
    #[error("chain store has not been initialized")]
    Uninitialized,

    /// The store exists but does not hold a usable chain.
    #[error("chain store {location} is corrupted: {reason}")]
    Corrupted { location: String, reason: String },

    /// Another writer holds the store lock.
    #[error("chain store is locked by another writer (lock file {0})")]
    Locked(PathBuf),

    /// Serialization failure while writing the chain.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Minting the genesis block failed.
    #[error("genesis mining failed: {0}")]
    Mining(#[from] MinerError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
