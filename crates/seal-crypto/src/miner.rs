use std::fmt;

use seal_types::{Block, BlockHeader, Digest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hasher::{HasherError, HeaderDigester};

/// Required number of leading `'0'` hex characters in a sealed block's hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Difficulty(u32);

impl Difficulty {
    /// Three leading hex zeros.
    pub const DEFAULT: Self = Self(3);
    /// A SHA-256 hex digest has 64 characters.
    pub const MAX: u32 = Digest::HEX_LEN as u32;

    pub fn new(zeros: u32) -> Result<Self, MinerError> {
        if zeros > Self::MAX {
            return Err(MinerError::InvalidDifficulty(zeros));
        }
        Ok(Self(zeros))
    }

    pub fn zeros(&self) -> u32 {
        self.0
    }

    /// Returns `true` if `digest` has at least this many leading hex zeros.
    pub fn is_met_by(&self, digest: &Digest) -> bool {
        digest.leading_zero_nibbles() >= self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Difficulty {
    type Error = MinerError;

    fn try_from(zeros: u32) -> Result<Self, Self::Error> {
        Self::new(zeros)
    }
}

impl From<Difficulty> for u32 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a nonce search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MiningOutcome {
    /// A nonce meeting the difficulty was found.
    Sealed {
        nonce: u64,
        hash: Digest,
        attempts: u64,
    },
    /// The iteration budget ran out. The block carries nonce 0 and its
    /// matching hash, which does not meet the difficulty.
    Unsealed { hash: Digest, attempts: u64 },
}

impl MiningOutcome {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::Sealed { nonce, .. } => *nonce,
            Self::Unsealed { .. } => 0,
        }
    }

    pub fn hash(&self) -> Digest {
        match self {
            Self::Sealed { hash, .. } | Self::Unsealed { hash, .. } => *hash,
        }
    }

    pub fn attempts(&self) -> u64 {
        match self {
            Self::Sealed { attempts, .. } | Self::Unsealed { attempts, .. } => *attempts,
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed { .. })
    }

    /// Attach this outcome's nonce and hash to `header`.
    pub fn into_block(self, header: BlockHeader) -> Block {
        header.seal(self.nonce(), self.hash())
    }
}

/// Single-threaded proof-of-work miner.
///
/// Tries `nonce = 0, 1, 2, …` and stops at the first digest with the
/// required prefix, or after `max_iters` attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Miner {
    pub difficulty: Difficulty,
    pub max_iters: u64,
}

impl Miner {
    pub const DEFAULT_MAX_ITERS: u64 = 100_000;

    pub fn new(difficulty: Difficulty, max_iters: u64) -> Self {
        Self {
            difficulty,
            max_iters,
        }
    }

    /// Search for a nonce that seals `header`.
    pub fn mine(&self, header: &BlockHeader) -> Result<MiningOutcome, MinerError> {
        let digester = HeaderDigester::new(header)?;

        for nonce in 0..self.max_iters {
            let hash = digester.digest(nonce);
            if self.difficulty.is_met_by(&hash) {
                debug!(
                    index = header.index,
                    nonce,
                    hash = %hash.short_hex(),
                    "block sealed"
                );
                return Ok(MiningOutcome::Sealed {
                    nonce,
                    hash,
                    attempts: nonce + 1,
                });
            }
        }

        warn!(
            index = header.index,
            difficulty = self.difficulty.zeros(),
            max_iters = self.max_iters,
            "mining budget exhausted; falling back to nonce 0"
        );
        Ok(MiningOutcome::Unsealed {
            hash: digester.digest(0),
            attempts: self.max_iters,
        })
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::new(Difficulty::DEFAULT, Self::DEFAULT_MAX_ITERS)
    }
}

/// Errors from mining.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MinerError {
    #[error("difficulty {0} exceeds the 64 hex characters of a SHA-256 digest")]
    InvalidDifficulty(u32),

    #[error(transparent)]
    Hasher(#[from] HasherError),
}
