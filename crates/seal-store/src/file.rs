use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use seal_types::Block;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::{RecoveryPolicy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::lock::StoreLock;
use crate::traits::{ChainStore, StoreState};

/// Chain store backed by a single pretty-printed JSON file.
///
/// On-disk format:
/// ```text
/// [
///   { "index": 0, "timestamp": "...", "data": {...}, "prevHash": "000...", "nonce": 0, "hash": "..." },
///   ...
/// ]
/// ```
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the chain file. Writers serialize on `<path>.lock`.
pub struct FileChainStore {
    config: StoreConfig,
}

impl FileChainStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Shorthand for a store at `path` with default settings.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the writer lock file.
    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.config.path, ".lock")
    }

    fn parent_dir(&self) -> PathBuf {
        match self.config.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl ChainStore for FileChainStore {
    fn load(&self) -> StoreResult<StoreState> {
        let raw = match fs::read_to_string(&self.config.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoreState::Uninitialized),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Ok(StoreState::Corrupted {
                    reason: format!("not valid UTF-8: {e}"),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(StoreState::Uninitialized);
        }

        match serde_json::from_str::<Vec<Block>>(&raw) {
            Ok(chain) => {
                debug!(path = %self.config.path.display(), blocks = chain.len(), "chain loaded");
                Ok(StoreState::from_chain(chain))
            }
            Err(e) => Ok(StoreState::Corrupted {
                reason: format!("unparseable chain file: {e}"),
            }),
        }
    }

    fn write(&self, chain: &[Block]) -> StoreResult<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, chain)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.config.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.config.path.display(), blocks = chain.len(), "chain written");
        Ok(())
    }

    fn lock(&self) -> StoreResult<StoreLock> {
        StoreLock::acquire(
            &self.lock_path(),
            Duration::from_millis(self.config.lock_timeout_ms),
        )
    }

    fn recovery_policy(&self) -> RecoveryPolicy {
        self.config.recovery
    }

    fn location(&self) -> String {
        self.config.path.display().to_string()
    }

    fn quarantine(&self) -> StoreResult<Option<PathBuf>> {
        if !self.config.path.exists() {
            return Ok(None);
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let target = sibling(&self.config.path, &format!(".corrupt-{millis}"));
        fs::rename(&self.config.path, &target)?;
        Ok(Some(target))
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
