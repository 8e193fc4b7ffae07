use seal_crypto::BlockHasher;
use seal_types::Block;
use serde::Serialize;

use crate::error::LedgerResult;

/// Outcome of a first-failure integrity check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub length: usize,
}

impl VerificationResult {
    fn passed(length: usize) -> Self {
        Self {
            ok: true,
            error: None,
            length,
        }
    }

    fn failed(error: String, length: usize) -> Self {
        Self {
            ok: false,
            error: Some(error),
            length,
        }
    }
}

/// Every violation found in a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub length: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violation a first-failure check would have reported.
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }
}

/// A specific integrity violation, located by position in the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub position: usize,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The chain is empty, or its first block is not a genesis block.
    BadGenesis,
    /// `index` differs from the block's position.
    IndexGap,
    /// `prevHash` differs from the previous block's `hash`.
    BrokenLink,
    /// The stored `hash` differs from the recomputed digest.
    HashMismatch,
}

/// Chain integrity checks. Pure; never touches storage.
pub struct ChainValidator;

impl ChainValidator {
    /// Walk from index 1 and stop at the first failure.
    ///
    /// The link is checked before the hash, so a block whose `prevHash` was
    /// edited reports `Broken link at index i` even though its hash no longer
    /// matches either.
    pub fn verify(chain: &[Block]) -> LedgerResult<VerificationResult> {
        let length = chain.len();
        for (i, pair) in chain.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);
            let i = i + 1;
            if curr.prev_hash != prev.hash {
                return Ok(VerificationResult::failed(
                    format!("Broken link at index {i}"),
                    length,
                ));
            }
            if !BlockHasher::verify(curr)? {
                return Ok(VerificationResult::failed(
                    format!("Hash mismatch at index {i}"),
                    length,
                ));
            }
        }
        Ok(VerificationResult::passed(length))
    }

    /// Check every block, genesis included, and collect every violation.
    pub fn verify_full(chain: &[Block]) -> LedgerResult<ValidationReport> {
        let mut violations = Vec::new();

        match chain.first() {
            None => violations.push(Violation {
                position: 0,
                kind: ViolationKind::BadGenesis,
                description: "chain is empty".into(),
            }),
            Some(genesis) if !genesis.is_genesis() => violations.push(Violation {
                position: 0,
                kind: ViolationKind::BadGenesis,
                description: format!(
                    "first block has index {} and prevHash {}",
                    genesis.index,
                    genesis.prev_hash.short_hex()
                ),
            }),
            Some(_) => {}
        }

        for (position, block) in chain.iter().enumerate() {
            if position > 0 {
                if block.index != position as u64 {
                    violations.push(Violation {
                        position,
                        kind: ViolationKind::IndexGap,
                        description: format!("expected index {position}, found {}", block.index),
                    });
                }
                if block.prev_hash != chain[position - 1].hash {
                    violations.push(Violation {
                        position,
                        kind: ViolationKind::BrokenLink,
                        description: format!("Broken link at index {position}"),
                    });
                }
            }

            if !BlockHasher::verify(block)? {
                violations.push(Violation {
                    position,
                    kind: ViolationKind::HashMismatch,
                    description: format!("Hash mismatch at index {position}"),
                });
            }
        }

        Ok(ValidationReport {
            length: chain.len(),
            violations,
        })
    }
}
