use std::sync::Mutex;

use seal_crypto::Miner;
use seal_store::{ChainStore, FileChainStore, Initialization, StoreError};
use seal_types::{Block, BlockHeader, Digest};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{LedgerConfig, SealPolicy};
use crate::error::{LedgerError, LedgerResult};
use crate::payment::PaymentEvent;
use crate::projection::AuditView;
use crate::validation::{ChainValidator, ValidationReport, VerificationResult};

/// Append-only proof-of-work ledger over a [`ChainStore`].
///
/// Appends are serialized twice: by an in-process mutex, and by the store's
/// write lock, which for file stores also excludes other processes. Reads take
/// neither; the store guarantees they see a complete chain.
pub struct Ledger<S: ChainStore> {
    store: S,
    miner: Miner,
    seal_policy: SealPolicy,
    writer: Mutex<()>,
}

impl Ledger<FileChainStore> {
    /// Open the file-backed ledger described by `config`.
    pub fn open(config: LedgerConfig) -> Self {
        let miner = config.miner();
        Self::new(FileChainStore::new(config.store), miner, config.seal_policy)
    }
}

impl<S: ChainStore> Ledger<S> {
    pub fn new(store: S, miner: Miner, seal_policy: SealPolicy) -> Self {
        Self {
            store,
            miner,
            seal_policy,
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn miner(&self) -> &Miner {
        &self.miner
    }

    /// Mint genesis if nothing is persisted yet, and report what was found.
    pub fn initialize(&self) -> LedgerResult<Initialization> {
        let _guard = self.writer.lock().map_err(|_| LedgerError::Poisoned)?;
        let (_, initialization) = self.store.ensure_initialized(&self.miner)?;
        Ok(initialization)
    }

    /// Mine `data` onto the tail of the chain and persist it.
    pub fn add_block(&self, data: Value) -> LedgerResult<Block> {
        let _guard = self.writer.lock().map_err(|_| LedgerError::Poisoned)?;
        let lock = self.store.lock()?;
        let (mut chain, _) = self.store.load_or_initialize(&self.miner, &lock)?;

        let tail = chain.last().ok_or_else(|| StoreError::Corrupted {
            location: self.store.location(),
            reason: "chain is empty".into(),
        })?;
        let index = tail.index.checked_add(1).ok_or_else(|| StoreError::Corrupted {
            location: self.store.location(),
            reason: format!("block index {} cannot be extended", tail.index),
        })?;
        let header = BlockHeader::new(index, tail.hash, data);

        let outcome = self.miner.mine(&header)?;
        if !outcome.is_sealed() {
            match self.seal_policy {
                SealPolicy::RejectUnsealed => {
                    return Err(LedgerError::Unsealed {
                        index: header.index,
                        difficulty: self.miner.difficulty.zeros(),
                        max_iters: self.miner.max_iters,
                    })
                }
                SealPolicy::AcceptUnsealed => {
                    warn!(index = header.index, "appending block without proof of work");
                }
            }
        }

        let block = outcome.into_block(header);
        chain.push(block.clone());
        self.store.write(&chain)?;

        info!(index = block.index, hash = %block.hash.short_hex(), nonce = block.nonce, "block appended");
        Ok(block)
    }

    /// The full chain, genesis first.
    pub fn chain(&self) -> LedgerResult<Vec<Block>> {
        let (chain, initialization) = self.store.ensure_initialized(&self.miner)?;
        if initialization != Initialization::Existing {
            debug!(?initialization, "chain initialized on read");
        }
        Ok(chain)
    }

    /// Linear scan for the block with `hash`. A malformed hash matches nothing.
    pub fn block_by_hash(&self, hash: &str) -> LedgerResult<Option<Block>> {
        let Ok(wanted) = hash.parse::<Digest>() else {
            return Ok(None);
        };
        Ok(self.chain()?.into_iter().find(|b| b.hash == wanted))
    }

    /// Like [`block_by_hash`](Self::block_by_hash), with a miss as an error.
    pub fn get_block(&self, hash: &str) -> LedgerResult<Block> {
        self.block_by_hash(hash)?
            .ok_or_else(|| LedgerError::NotFound(hash.to_owned()))
    }

    /// The most recent block.
    pub fn head(&self) -> LedgerResult<Block> {
        self.chain()?
            .pop()
            .ok_or_else(|| LedgerError::NotFound("head".into()))
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.chain()?.len())
    }

    /// First-failure integrity check of the persisted chain.
    pub fn verify_chain(&self) -> LedgerResult<VerificationResult> {
        let result = ChainValidator::verify(&self.chain()?)?;
        if let Some(error) = &result.error {
            warn!(%error, length = result.length, "chain verification failed");
        }
        Ok(result)
    }

    /// Integrity check that reports every violation.
    pub fn verify_chain_full(&self) -> LedgerResult<ValidationReport> {
        let report = ChainValidator::verify_full(&self.chain()?)?;
        if !report.is_valid() {
            warn!(violations = report.violations.len(), "chain verification failed");
        }
        Ok(report)
    }

    /// Validate and append a payment event.
    pub fn record_payment(&self, event: &PaymentEvent) -> LedgerResult<Block> {
        let payload = event.to_payload()?;
        self.add_block(payload)
    }

    /// Audit projection of the whole chain.
    pub fn audit(&self) -> LedgerResult<AuditView> {
        Ok(AuditView::build(&self.chain()?))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use seal_crypto::{BlockHasher, Difficulty};
    use seal_store::{InMemoryChainStore, StoreConfig};
    use serde_json::json;

    use super::*;

    fn miner() -> Miner {
        Miner::new(Difficulty::new(2).unwrap(), 100_000)
    }

    fn ledger() -> Ledger<InMemoryChainStore> {
        Ledger::new(InMemoryChainStore::new(), miner(), SealPolicy::AcceptUnsealed)
    }

    #[test]
    fn first_read_creates_genesis() {
        let ledger = ledger();
        let chain = ledger.chain().unwrap();
        assert_eq!(chain.len(), 1);
        let genesis = &chain[0];
        assert_eq!(genesis.index, 0);
        assert!(genesis.prev_hash.is_zero());
        assert_eq!(genesis.data, json!({ "meta": { "type": "GENESIS" } }));
        assert!(BlockHasher::verify(genesis).unwrap());
    }

    #[test]
    fn initialize_is_idempotent() {
        let ledger = ledger();
        assert_eq!(ledger.initialize().unwrap(), Initialization::Created);
        assert_eq!(ledger.initialize().unwrap(), Initialization::Existing);
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn appends_link_to_the_tail() {
        let ledger = ledger();
        let first = ledger.add_block(json!({ "amount": 1 })).unwrap();
        let second = ledger.add_block(json!({ "amount": 2 })).unwrap();

        let chain = ledger.chain().unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(first.index, 1);
        assert_eq!(first.prev_hash, chain[0].hash);
        assert_eq!(second.index, 2);
        assert_eq!(second.prev_hash, first.hash);
        assert_eq!(ledger.head().unwrap(), second);
        for (i, block) in chain.iter().enumerate() {
            assert_eq!(block.index, i as u64);
        }
    }

    #[test]
    fn appended_blocks_carry_proof_of_work() {
        let ledger = ledger();
        let block = ledger.add_block(json!("payload")).unwrap();
        assert!(block.hash.to_hex().starts_with("00"));
        assert!(BlockHasher::verify(&block).unwrap());
    }

    #[test]
    fn lookup_by_hash() {
        let ledger = ledger();
        let block = ledger.add_block(json!({ "k": "v" })).unwrap();

        assert_eq!(ledger.block_by_hash(&block.hash.to_hex()).unwrap(), Some(block.clone()));
        assert_eq!(ledger.get_block(&block.hash.to_hex()).unwrap(), block);
        assert_eq!(ledger.block_by_hash(&"f".repeat(64)).unwrap(), None);
        assert_eq!(ledger.block_by_hash("not-a-hash").unwrap(), None);
        assert!(matches!(
            ledger.get_block("nope"),
            Err(LedgerError::NotFound(h)) if h == "nope"
        ));
    }

    #[test]
    fn verify_detects_tampering_in_store() {
        let ledger = ledger();
        ledger.add_block(json!({ "amount": 10 })).unwrap();
        ledger.add_block(json!({ "amount": 20 })).unwrap();
        assert!(ledger.verify_chain().unwrap().ok);

        let mut chain = ledger.chain().unwrap();
        chain[1].data = json!({ "amount": 1_000_000 });
        ledger.store().replace(chain);

        let result = ledger.verify_chain().unwrap();
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("Hash mismatch at index 1"));
        assert_eq!(result.length, 3);
        assert!(!ledger.verify_chain_full().unwrap().is_valid());
    }

    #[test]
    fn unsealed_blocks_follow_policy() {
        let impossible = Miner::new(Difficulty::new(64).unwrap(), 5);

        let lenient = Ledger::new(InMemoryChainStore::new(), impossible, SealPolicy::AcceptUnsealed);
        let block = lenient.add_block(json!(1)).unwrap();
        assert_eq!(block.nonce, 0);
        assert!(lenient.verify_chain().unwrap().ok);

        let strict = Ledger::new(InMemoryChainStore::new(), impossible, SealPolicy::RejectUnsealed);
        let err = strict.add_block(json!(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Unsealed { index: 1, .. }));
        // Genesis was still minted; nothing else was written.
        assert_eq!(strict.len().unwrap(), 1);
    }

    #[test]
    fn invalid_payment_leaves_store_untouched() {
        let ledger = ledger();
        let err = ledger.record_payment(&PaymentEvent::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.store().write_count(), 0);
    }

    #[test]
    fn payment_and_audit() {
        let ledger = ledger();
        let block = ledger
            .record_payment(&PaymentEvent::new(499).with_vpa("name@bank.com"))
            .unwrap();
        assert_eq!(block.data["maskedVpa"], json!("na**@bank.com"));
        assert_eq!(block.meta_type(), Some("UPI_MASKEDMETA"));

        let audit = ledger.audit().unwrap();
        assert_eq!(audit.length, 2);
        assert_eq!(audit.entries[1].hash, block.hash);
        assert_eq!(audit.entries[1].kind.as_deref(), Some("UPI_MASKEDMETA"));
    }

    #[test]
    fn corrupted_store_surfaces_as_store_error() {
        let store = InMemoryChainStore::new();
        store.replace(Vec::new());
        let ledger = Ledger::new(store, miner(), SealPolicy::AcceptUnsealed);
        assert!(matches!(
            ledger.add_block(json!(1)),
            Err(LedgerError::Store(StoreError::Corrupted { .. }))
        ));
        assert!(matches!(
            ledger.chain(),
            Err(LedgerError::Store(StoreError::Corrupted { .. }))
        ));
    }

    #[test]
    fn concurrent_appends_are_serialized() {
        let ledger = Arc::new(ledger());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.add_block(json!({ "writer": i })).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let chain = ledger.chain().unwrap();
        assert_eq!(chain.len(), 9);
        assert!(ledger.verify_chain_full().unwrap().is_valid());
    }

    #[test]
    fn exhausted_index_is_corruption() {
        let ledger = ledger();
        let mut chain = ledger.chain().unwrap();
        let tail = BlockHeader::new(u64::MAX, chain[0].hash, json!({ "amount": 1 }));
        let hash = BlockHasher::digest(&tail, 0).unwrap();
        chain.push(tail.seal(0, hash));
        ledger.store().replace(chain);

        let err = ledger.add_block(json!({ "amount": 2 })).unwrap_err();
        assert!(matches!(
            &err,
            LedgerError::Store(StoreError::Corrupted { reason, .. }) if reason.contains("cannot be extended")
        ));
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn file_ledger_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig {
            store: StoreConfig::new(dir.path().join("chain.json")),
            difficulty: Difficulty::new(1).unwrap(),
            ..LedgerConfig::default()
        };

        let block = Ledger::open(config.clone()).add_block(json!({ "n": 1 })).unwrap();
        let reopened = Ledger::open(config);
        assert_eq!(reopened.len().unwrap(), 2);
        assert_eq!(reopened.head().unwrap(), block);
        assert!(reopened.store().lock().is_ok());
    }
}
