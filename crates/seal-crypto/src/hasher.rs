use seal_types::{Block, BlockHeader, Digest};
use sha2::{Digest as _, Sha256};

/// Canonical SHA-256 block hasher.
///
/// The hash input is the compact JSON object
///
/// ```text
/// {"index":<u64>,"timestamp":"<iso>","data":<json>,"prevHash":"<hex>","nonce":<u64>}
/// ```
///
/// with the keys always in this order and `data` rendered by `serde_json`.
/// Two blocks with identical field values always hash identically.
pub struct BlockHasher;

impl BlockHasher {
    /// Canonical bytes for a header sealed with `nonce`.
    pub fn canonical_bytes(header: &BlockHeader, nonce: u64) -> Result<Vec<u8>, HasherError> {
        let mut buf = canonical_prefix(header)?;
        buf.extend_from_slice(nonce.to_string().as_bytes());
        buf.push(b'}');
        Ok(buf)
    }

    /// Digest of a header sealed with `nonce`.
    pub fn digest(header: &BlockHeader, nonce: u64) -> Result<Digest, HasherError> {
        Ok(HeaderDigester::new(header)?.digest(nonce))
    }

    /// Recompute the digest of a sealed block from its own fields.
    pub fn digest_block(block: &Block) -> Result<Digest, HasherError> {
        let header = block.header();
        Self::digest(&header, block.nonce)
    }

    /// Returns `true` if the stored hash matches the recomputed one.
    pub fn verify(block: &Block) -> Result<bool, HasherError> {
        Ok(Self::digest_block(block)? == block.hash)
    }
}

/// Hashing state with a header's canonical prefix already absorbed.
///
/// Only the nonce changes between mining attempts, so the prefix is hashed
/// once and the state cloned per attempt.
#[derive(Clone)]
pub struct HeaderDigester {
    state: Sha256,
}

impl HeaderDigester {
    pub fn new(header: &BlockHeader) -> Result<Self, HasherError> {
        let mut state = Sha256::new();
        state.update(canonical_prefix(header)?);
        Ok(Self { state })
    }

    /// Finish the canonical encoding with `nonce` and return the digest.
    pub fn digest(&self, nonce: u64) -> Digest {
        let mut state = self.state.clone();
        state.update(nonce.to_string().as_bytes());
        state.update(b"}");
        Digest::from_hash(state.finalize().into())
    }
}

/// Everything up to and including `"nonce":`.
fn canonical_prefix(header: &BlockHeader) -> Result<Vec<u8>, HasherError> {
    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(b"{\"index\":");
    write_json(&mut buf, &header.index)?;
    buf.extend_from_slice(b",\"timestamp\":");
    write_json(&mut buf, header.timestamp.as_str())?;
    buf.extend_from_slice(b",\"data\":");
    write_json(&mut buf, &header.data)?;
    buf.extend_from_slice(b",\"prevHash\":");
    write_json(&mut buf, &header.prev_hash.to_hex())?;
    buf.extend_from_slice(b",\"nonce\":");
    Ok(buf)
}

fn write_json<T: serde::Serialize + ?Sized>(buf: &mut Vec<u8>, value: &T) -> Result<(), HasherError> {
    serde_json::to_writer(buf, value).map_err(|e| HasherError::Serialization(e.to_string()))
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
