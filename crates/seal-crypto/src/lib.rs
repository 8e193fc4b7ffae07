//! Cryptographic primitives for SealChain.
//!
//! Provides the canonical SHA-256 block hasher and the proof-of-work miner
//! that seals block headers. All hashing wraps the `sha2` crate; no custom
//! cryptography.

pub mod hasher;
pub mod miner;

pub use hasher::{BlockHasher, HasherError, HeaderDigester};
pub use miner::{Difficulty, Miner, MinerError, MiningOutcome};
