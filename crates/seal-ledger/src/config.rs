use seal_crypto::{Difficulty, Miner};
use seal_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Whether a block whose nonce search ran out may be appended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealPolicy {
    /// Append it with nonce 0 and log a warning.
    #[default]
    AcceptUnsealed,
    /// Fail the append with [`LedgerError::Unsealed`](crate::LedgerError::Unsealed).
    RejectUnsealed,
}

/// Ledger settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub store: StoreConfig,
    pub difficulty: Difficulty,
    pub max_iters: u64,
    pub seal_policy: SealPolicy,
}

impl LedgerConfig {
    pub fn miner(&self) -> Miner {
        Miner::new(self.difficulty, self.max_iters)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            difficulty: Difficulty::DEFAULT,
            max_iters: Miner::DEFAULT_MAX_ITERS,
            seal_policy: SealPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use seal_store::RecoveryPolicy;

    use super::*;

    #[test]
    fn defaults() {
        let c = LedgerConfig::default();
        assert_eq!(c.store.path, PathBuf::from("data/chain.json"));
        assert_eq!(c.store.recovery, RecoveryPolicy::Fail);
        assert_eq!(c.difficulty.zeros(), 3);
        assert_eq!(c.max_iters, 100_000);
        assert_eq!(c.seal_policy, SealPolicy::AcceptUnsealed);
        assert_eq!(c.miner(), Miner::default());
    }

    #[test]
    fn nested_partial_config() {
        let c: LedgerConfig = serde_json::from_str(
            r#"{"difficulty":2,"seal_policy":"reject_unsealed","store":{"recovery":"reinitialize"}}"#,
        )
        .unwrap();
        assert_eq!(c.difficulty.zeros(), 2);
        assert_eq!(c.seal_policy, SealPolicy::RejectUnsealed);
        assert_eq!(c.store.recovery, RecoveryPolicy::Reinitialize);
        assert_eq!(c.store.path, PathBuf::from("data/chain.json"));
        assert_eq!(c.max_iters, 100_000);
    }

    #[test]
    fn rejects_impossible_difficulty() {
        assert!(serde_json::from_str::<LedgerConfig>(r#"{"difficulty":65}"#).is_err());
    }
}
