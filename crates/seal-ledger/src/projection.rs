use seal_types::{Block, Digest, Timestamp};
use serde::Serialize;
use serde_json::Number;

/// Row in the audit view. Carries no payload fields beyond amount and type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub index: u64,
    pub timestamp: Timestamp,
    pub hash: Digest,
    pub prev_hash: Digest,
    pub amount: Option<Number>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl From<&Block> for AuditEntry {
    fn from(block: &Block) -> Self {
        Self {
            index: block.index,
            timestamp: block.timestamp.clone(),
            hash: block.hash,
            prev_hash: block.prev_hash,
            amount: block.amount().cloned(),
            kind: block.meta_type().map(str::to_owned),
        }
    }
}

/// Audit projection of a whole chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditView {
    pub entries: Vec<AuditEntry>,
    pub length: usize,
}

impl AuditView {
    pub fn build(chain: &[Block]) -> Self {
        Self {
            entries: chain.iter().map(AuditEntry::from).collect(),
            length: chain.len(),
        }
    }

    /// Sum of all numeric amounts, for summaries.
    pub fn total_amount(&self) -> f64 {
        self.entries
            .iter()
            .filter_map(|e| e.amount.as_ref().and_then(Number::as_f64))
            .sum()
    }
}
