use std::path::PathBuf;

use seal_crypto::Miner;
use seal_types::{Block, BlockHeader};
use tracing::{info, warn};

use crate::config::RecoveryPolicy;
use crate::error::{StoreError, StoreResult};
use crate::lock::StoreLock;

/// What a store currently holds.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreState {
    /// Nothing has been persisted yet.
    Uninitialized,
    /// A chain whose first block is a genesis block.
    Initialized(Vec<Block>),
    /// Persisted content that is not a usable chain.
    Corrupted { reason: String },
}

impl StoreState {
    /// Classify a parsed chain: it must be non-empty and start at index 0.
    pub fn from_chain(chain: Vec<Block>) -> Self {
        match chain.first() {
            None => Self::Corrupted {
                reason: "chain is empty".into(),
            },
            Some(first) if first.index != 0 => Self::Corrupted {
                reason: format!("first block has index {}, expected genesis", first.index),
            },
            Some(_) => Self::Initialized(chain),
        }
    }
}

/// How [`ChainStore::ensure_initialized`] found the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Initialization {
    /// A valid chain was already present.
    Existing,
    /// The store was empty and a genesis block was written.
    Created,
    /// The store was corrupted; its content was moved aside (when the
    /// backend supports it) and a new genesis block was written.
    Reinitialized { quarantined: Option<PathBuf> },
}

/// Persistent home of the block sequence.
///
/// All implementations must satisfy these invariants:
/// - `write` replaces the whole chain; readers never observe a partial write.
/// - `load` reports corruption as [`StoreState::Corrupted`], and only I/O
///   failures as `Err`.
/// - Anything that writes must hold the [`StoreLock`] returned by `lock`.
pub trait ChainStore: Send + Sync {
    /// Read and classify the persisted content.
    fn load(&self) -> StoreResult<StoreState>;

    /// Replace the persisted chain.
    fn write(&self, chain: &[Block]) -> StoreResult<()>;

    /// Acquire exclusive write access, waiting up to the configured timeout.
    fn lock(&self) -> StoreResult<StoreLock>;

    /// Corruption handling configured for this store.
    fn recovery_policy(&self) -> RecoveryPolicy;

    /// Human-readable location for logs and errors.
    fn location(&self) -> String;

    /// Move unusable content aside before reinitialization.
    ///
    /// Returns where it went. Backends without a place to keep it return
    /// `Ok(None)`.
    fn quarantine(&self) -> StoreResult<Option<PathBuf>> {
        Ok(None)
    }

    /// Load the full chain, failing if it is missing or corrupted.
    fn read(&self) -> StoreResult<Vec<Block>> {
        match self.load()? {
            StoreState::Initialized(chain) => Ok(chain),
            StoreState::Uninitialized => Err(StoreError::Uninitialized),
            StoreState::Corrupted { reason } => Err(StoreError::Corrupted {
                location: self.location(),
                reason,
            }),
        }
    }

    /// Return the chain, minting and persisting genesis first if the store is
    /// uninitialized. Takes the write lock only when it has to write.
    fn ensure_initialized(&self, miner: &Miner) -> StoreResult<(Vec<Block>, Initialization)> {
        if let StoreState::Initialized(chain) = self.load()? {
            return Ok((chain, Initialization::Existing));
        }
        let lock = self.lock()?;
        self.load_or_initialize(miner, &lock)
    }

    /// Like [`ensure_initialized`](Self::ensure_initialized), for callers that
    /// already hold the write lock.
    fn load_or_initialize(
        &self,
        miner: &Miner,
        _lock: &StoreLock,
    ) -> StoreResult<(Vec<Block>, Initialization)> {
        let initialization = match self.load()? {
            StoreState::Initialized(chain) => return Ok((chain, Initialization::Existing)),
            StoreState::Uninitialized => Initialization::Created,
            StoreState::Corrupted { reason } => match self.recovery_policy() {
                RecoveryPolicy::Fail => {
                    return Err(StoreError::Corrupted {
                        location: self.location(),
                        reason,
                    })
                }
                RecoveryPolicy::Reinitialize => {
                    let quarantined = self.quarantine()?;
                    warn!(
                        location = %self.location(),
                        %reason,
                        ?quarantined,
                        "corrupted chain store; reinitializing"
                    );
                    Initialization::Reinitialized { quarantined }
                }
            },
        };

        let header = BlockHeader::genesis();
        let genesis = miner.mine(&header)?.into_block(header);
        let chain = vec![genesis];
        self.write(&chain)?;
        info!(location = %self.location(), hash = %chain[0].hash, "genesis block written");
        Ok((chain, initialization))
    }
}
