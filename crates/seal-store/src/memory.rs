use std::sync::{Mutex, RwLock};

use seal_types::Block;

use crate::config::RecoveryPolicy;
use crate::error::StoreResult;
use crate::lock::StoreLock;
use crate::traits::{ChainStore, StoreState};

/// In-memory chain store for tests, local demos, and embedding.
///
/// Writers in the same process are serialized by the ledger that owns the
/// store, so [`ChainStore::lock`] hands out an in-process lock.
pub struct InMemoryChainStore {
    state: RwLock<StoreState>,
    recovery: RecoveryPolicy,
    writes: Mutex<u64>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::with_state(StoreState::Uninitialized)
    }

    /// Start from a specific state, e.g. a pre-built chain or a corrupted store.
    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
            recovery: RecoveryPolicy::default(),
            writes: Mutex::new(0),
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Overwrite the stored chain without any checks.
    pub fn replace(&self, chain: Vec<Block>) {
        *self.state.write().expect("lock poisoned") = StoreState::from_chain(chain);
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> u64 {
        *self.writes.lock().expect("lock poisoned")
    }
}

impl Default for InMemoryChainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStore for InMemoryChainStore {
    fn load(&self) -> StoreResult<StoreState> {
        Ok(self.state.read().expect("lock poisoned").clone())
    }

    fn write(&self, chain: &[Block]) -> StoreResult<()> {
        *self.state.write().expect("lock poisoned") = StoreState::from_chain(chain.to_vec());
        *self.writes.lock().expect("lock poisoned") += 1;
        Ok(())
    }

    fn lock(&self) -> StoreResult<StoreLock> {
        Ok(StoreLock::in_process())
    }

    fn recovery_policy(&self) -> RecoveryPolicy {
        self.recovery
    }

    fn location(&self) -> String {
        "memory".into()
    }
}
