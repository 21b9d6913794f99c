//! In-process reference ledger.
//!
//! Holds a [`ProposalBook`] behind a mutex together with a FIFO pool of
//! submitted-but-unmined transactions. Submitting only queues; confirming a
//! hash mines every queued transaction up to and including it, in submission
//! order, one transaction per block.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ballot_types::{
    Address, Candidate, CandidateTally, Clock, LedgerCall, LedgerError, LedgerResult, ProposalId,
    ProposalRecord, Receipt, SystemClock, TxHash, TxStatus,
};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tracing::{debug, info};

use crate::book::ProposalBook;
use crate::config::LedgerConfig;
use crate::contract::LedgerContract;
use crate::snapshot::LedgerSnapshot;

struct PendingTx {
    hash: TxHash,
    from: Address,
    call: LedgerCall,
}

struct LedgerInner {
    book: ProposalBook,
    pending: VecDeque<PendingTx>,
    receipts: HashMap<TxHash, Receipt>,
    block_height: u64,
    nonce: u64,
}

impl LedgerInner {
    fn mine_next(&mut self, now: ballot_types::Timestamp) -> Option<Receipt> {
        let tx = self.pending.pop_front()?;
        self.block_height += 1;
        let method = tx.call.method();
        let status = match self.book.apply(&tx.from, tx.call, now) {
            Ok(proposal_id) => TxStatus::Applied { proposal_id },
            Err(error) => {
                debug!(hash = %tx.hash, method, %error, "transaction reverted");
                TxStatus::Reverted { error }
            }
        };
        let receipt = Receipt {
            tx_hash: tx.hash,
            block: self.block_height,
            status,
        };
        debug!(hash = %tx.hash, block = receipt.block, method, "transaction mined");
        self.receipts.insert(tx.hash, receipt.clone());
        Some(receipt)
    }
}

/// A thread-safe ledger living in this process.
pub struct MemoryLedger {
    inner: Mutex<LedgerInner>,
    clock: Arc<dyn Clock>,
}

impl MemoryLedger {
    /// An empty ledger on the system clock.
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_book(ProposalBook::new(config), 0, clock)
    }

    /// Restore a ledger from a snapshot. The snapshot's policy is replaced by
    /// `config` so operators can change between restarts.
    pub fn from_snapshot(snapshot: LedgerSnapshot, config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        let mut book = snapshot.book;
        book.set_config(config);
        Self::from_book(book, snapshot.block_height, clock)
    }

    fn from_book(book: ProposalBook, block_height: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                book,
                pending: VecDeque::new(),
                receipts: HashMap::new(),
                block_height,
                nonce: 0,
            }),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Capture the book and block height. Unmined transactions are not included.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.lock();
        LedgerSnapshot::create(inner.book.clone(), inner.block_height, self.clock.now())
    }

    pub fn block_height(&self) -> u64 {
        self.lock().block_height
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Run a closure against the current book.
    pub fn with_book<R>(&self, f: impl FnOnce(&ProposalBook) -> R) -> R {
        f(&self.lock().book)
    }

    /// Queue a call and return its transaction hash.
    pub fn submit_call(&self, from: &Address, call: LedgerCall) -> TxHash {
        let mut inner = self.lock();
        inner.nonce += 1;
        let hash = tx_hash(inner.nonce, from, &call);
        debug!(%hash, %from, method = call.method(), "transaction queued");
        inner.pending.push_back(PendingTx {
            hash,
            from: from.clone(),
            call,
        });
        hash
    }

    /// Mine up to and including `hash`, returning its receipt.
    pub fn confirm_tx(&self, hash: &TxHash) -> LedgerResult<Receipt> {
        let mut inner = self.lock();
        if let Some(receipt) = inner.receipts.get(hash) {
            return Ok(receipt.clone());
        }
        if !inner.pending.iter().any(|tx| &tx.hash == hash) {
            return Err(LedgerError::UnknownTransaction(*hash));
        }
        loop {
            match inner.mine_next(self.clock.now()) {
                Some(receipt) if &receipt.tx_hash == hash => return Ok(receipt),
                Some(_) => continue,
                None => return Err(LedgerError::UnknownTransaction(*hash)),
            }
        }
    }

    /// Mine everything currently queued.
    pub fn mine_pending(&self) -> Vec<Receipt> {
        let mut inner = self.lock();
        let mut mined = Vec::with_capacity(inner.pending.len());
        while let Some(receipt) = inner.mine_next(self.clock.now()) {
            mined.push(receipt);
        }
        if !mined.is_empty() {
            info!(count = mined.len(), height = inner.block_height, "mined pending transactions");
        }
        mined
    }
}

fn tx_hash(nonce: u64, from: &Address, call: &LedgerCall) -> TxHash {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(nonce.to_le_bytes());
    hasher.update(from.as_str().as_bytes());
    hasher.update(serde_json::to_vec(call).unwrap_or_default());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    TxHash::new(out)
}

#[async_trait]
impl LedgerContract for MemoryLedger {
    async fn proposal_count(&self) -> LedgerResult<u64> {
        Ok(self.lock().book.count())
    }

    async fn proposal(&self, id: ProposalId) -> LedgerResult<ProposalRecord> {
        self.lock().book.record(id)
    }

    async fn proposal_candidates(&self, id: ProposalId) -> LedgerResult<Vec<Candidate>> {
        self.lock().book.candidates(id)
    }

    async fn proposal_results(&self, id: ProposalId) -> LedgerResult<Vec<CandidateTally>> {
        self.lock().book.results(id)
    }

    async fn has_voted(&self, id: ProposalId, voter: &Address) -> LedgerResult<bool> {
        self.lock().book.has_voted(id, voter)
    }

    async fn submit(&self, from: &Address, call: LedgerCall) -> LedgerResult<TxHash> {
        Ok(self.submit_call(from, call))
    }

    async fn confirm(&self, tx: &TxHash) -> LedgerResult<Receipt> {
        self.confirm_tx(tx)
    }
}
