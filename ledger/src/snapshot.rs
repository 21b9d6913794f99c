//! Ledger snapshots: persist the proposal book between restarts of a dev node.
//!
//! The snapshot hash is computed deterministically from the book and block
//! height so a tampered or truncated file is detected on load.

use std::fs;
use std::path::Path;

use ballot_types::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::book::ProposalBook;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Encoding(String),

    #[error("snapshot hash mismatch")]
    HashMismatch,

    #[error("unsupported snapshot version {0}")]
    Version(u32),
}

/// The ledger's durable state at a point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of the encoded book and block height.
    pub hash: [u8; 32],
    pub block_height: u64,
    /// Not covered by the hash.
    pub created_at: Timestamp,
    pub book: ProposalBook,
    pub version: u32,
}

impl LedgerSnapshot {
    pub const VERSION: u32 = 1;

    pub fn create(book: ProposalBook, block_height: u64, created_at: Timestamp) -> Self {
        let mut snap = Self {
            hash: [0u8; 32],
            block_height,
            created_at,
            book,
            version: Self::VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(bincode::serialize(&self.book).unwrap_or_default());
        hasher.update(self.block_height.to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches its contents.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snap: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::Encoding(e.to_string()))?;
        if snap.version != Self::VERSION {
            return Err(SnapshotError::Version(snap.version));
        }
        if !snap.verify() {
            return Err(SnapshotError::HashMismatch);
        }
        Ok(snap)
    }

    /// Write atomically: encode to a sibling temp file, then rename over `path`.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load a snapshot, or `None` if the file does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
