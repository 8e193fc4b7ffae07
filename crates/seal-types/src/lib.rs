//! Foundation types for SealChain.
//!
//! This crate provides the block model and the value types it is built from.
//! Every other SealChain crate depends on `seal-types`.
//!
//! # Key Types
//!
//! - [`Digest`] -- 32-byte SHA-256 digest, rendered as 64 lowercase hex characters
//! - [`Timestamp`] -- ISO-8601 creation time, kept verbatim so hashing stays stable
//! - [`BlockHeader`] -- the unsealed fields a miner works on
//! - [`Block`] -- a sealed, hash-linked ledger record

pub mod block;
pub mod digest;
pub mod error;
pub mod timestamp;

pub use block::{Block, BlockHeader, GENESIS_TYPE};
pub use digest::Digest;
pub use error::TypeError;
pub use timestamp::Timestamp;
