use seal_crypto::{HasherError, MinerError};
use seal_store::StoreError;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The payload was rejected before touching the store.
    #[error("invalid payload: {0}")]
    Validation(String),

    #[error("block not found: {0}")]
    NotFound(String),

    /// Mining ran out of iterations and the seal policy rejects unsealed blocks.
    #[error("block {index} could not be sealed at difficulty {difficulty} within {max_iters} iterations")]
    Unsealed {
        index: u64,
        difficulty: u32,
        max_iters: u64,
    },

    /// A writer panicked while holding the append mutex.
    #[error("ledger writer lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Miner(#[from] MinerError),

    #[error(transparent)]
    Hasher(#[from] HasherError),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
