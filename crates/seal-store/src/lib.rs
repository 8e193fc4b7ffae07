//! Chain storage for SealChain.
//!
//! The chain is persisted as a single JSON array of blocks in index order.
//! It is read in full and replaced in full on every append.
//!
//! # Storage Backends
//!
//! All backends implement the [`ChainStore`] trait:
//!
//! - [`FileChainStore`] -- one JSON file, atomic replace, `.lock` file for writers
//! - [`InMemoryChainStore`] -- `RwLock`-guarded chain for tests and embedding
//!
//! # Design Rules
//!
//! 1. A missing (or empty) store is *uninitialized*; the first access mints genesis.
//! 2. A store that exists but cannot be parsed, or whose first block is not a
//!    genesis block, is *corrupted*. What happens next is the configured
//!    [`RecoveryPolicy`]; nothing is discarded unless the policy says so.
//! 3. Writes replace the whole file through a temp file and a rename, so a
//!    reader sees either the old chain or the new one.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod traits;

pub use config::{RecoveryPolicy, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use file::FileChainStore;
pub use lock::StoreLock;
pub use memory::InMemoryChainStore;
pub use traits::{ChainStore, Initialization, StoreState};
