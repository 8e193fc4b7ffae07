use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::digest::Digest;
use crate::timestamp::Timestamp;

/// `data.meta.type` of the genesis block.
pub const GENESIS_TYPE: &str = "GENESIS";

/// The unsealed part of a block: everything except the nonce and the hash.
///
/// A header is what the miner works on. Sealing it with a nonce and the
/// resulting digest produces a [`Block`].
#[derive(Clone, Debug, PartialEq)]
pub struct BlockHeader {
    pub index: u64,
    pub timestamp: Timestamp,
    pub data: Value,
    pub prev_hash: Digest,
}

impl BlockHeader {
    /// Header for a new block stamped with the current time.
    pub fn new(index: u64, prev_hash: Digest, data: Value) -> Self {
        Self {
            index,
            timestamp: Timestamp::now(),
            data,
            prev_hash,
        }
    }

    /// Header for a genesis block: index 0, zero back-link, `GENESIS` payload.
    pub fn genesis() -> Self {
        Self::new(0, Digest::zero(), json!({ "meta": { "type": GENESIS_TYPE } }))
    }

    /// Attach the miner's nonce and the matching digest.
    pub fn seal(self, nonce: u64, hash: Digest) -> Block {
        Block {
            index: self.index,
            timestamp: self.timestamp,
            data: self.data,
            prev_hash: self.prev_hash,
            nonce,
            hash,
        }
    }
}

/// A sealed, hash-linked ledger record.
///
/// Field order here is the persisted field order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Block {
    /// Position in the chain, 0 for genesis.
    pub index: u64,
    /// Creation time, never mutated.
    pub timestamp: Timestamp,
    /// Caller payload, opaque to the ledger.
    pub data: Value,
    /// Hash of the previous block; all zeros for genesis.
    pub prev_hash: Digest,
    /// Proof-of-work nonce chosen by the miner.
    pub nonce: u64,
    /// Digest of `{index, timestamp, data, prevHash, nonce}`.
    pub hash: Digest,
}

impl Block {
    /// The unsealed fields of this block.
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            index: self.index,
            timestamp: self.timestamp.clone(),
            data: self.data.clone(),
            prev_hash: self.prev_hash,
        }
    }

    /// Structural genesis check: index 0 with a zero back-link.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.prev_hash.is_zero()
    }

    /// `data.meta.type`, when the payload carries one.
    pub fn meta_type(&self) -> Option<&str> {
        self.data.get("meta")?.get("type")?.as_str()
    }

    /// `data.amount`, when the payload carries a numeric amount.
    pub fn amount(&self) -> Option<&serde_json::Number> {
        match self.data.get("amount")? {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}
