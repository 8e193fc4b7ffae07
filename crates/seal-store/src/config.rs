use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What to do when the persisted chain exists but is unusable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// Refuse to touch the store and report corruption to the caller.
    #[default]
    Fail,
    /// Move the unusable file aside and start a fresh chain from genesis.
    Reinitialize,
}

/// Location and behaviour of a chain store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the chain file.
    pub path: PathBuf,
    /// Corruption handling.
    pub recovery: RecoveryPolicy,
    /// How long a writer waits for the lock file before giving up.
    pub lock_timeout_ms: u64,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/chain.json"),
            recovery: RecoveryPolicy::Fail,
            lock_timeout_ms: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.path, PathBuf::from("data/chain.json"));
        assert_eq!(c.recovery, RecoveryPolicy::Fail);
        assert_eq!(c.lock_timeout_ms, 2_000);
    }

    #[test]
    fn builder_overrides() {
        let c = StoreConfig::new("/tmp/x.json").with_recovery(RecoveryPolicy::Reinitialize);
        assert_eq!(c.path, PathBuf::from("/tmp/x.json"));
        assert_eq!(c.recovery, RecoveryPolicy::Reinitialize);
    }

    #[test]
    fn recovery_policy_names() {
        let p: RecoveryPolicy = serde_json::from_str("\"reinitialize\"").unwrap();
        assert_eq!(p, RecoveryPolicy::Reinitialize);
        assert_eq!(serde_json::to_string(&RecoveryPolicy::Fail).unwrap(), "\"fail\"");
    }

    #[test]
    fn partial_config_uses_defaults() {
        let c: StoreConfig = serde_json::from_str(r#"{"path":"ledger.json"}"#).unwrap();
        assert_eq!(c.path, PathBuf::from("ledger.json"));
        assert_eq!(c.recovery, RecoveryPolicy::Fail);
    }
}
