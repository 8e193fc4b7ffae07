use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use seal_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server settings, loadable from TOML:
///
/// ```toml
/// bind_addr = "0.0.0.0:8002"
///
/// [ledger]
/// difficulty = 3
/// max_iters = 100000
/// seal_policy = "accept_unsealed"
///
/// [ledger.store]
/// path = "data/chain.json"
/// recovery = "fail"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub ledger: LedgerConfig,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 8002;

    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, Self::DEFAULT_PORT)),
            ledger: LedgerConfig::default(),
        }
    }
}
