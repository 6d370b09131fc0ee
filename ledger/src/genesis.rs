//! Genesis block creation.
//!
//! The genesis block is index 1, links to the `"0"` placeholder, carries no
//! transactions and records the candidate slate the election runs with.

use std::collections::HashSet;

use ballot_types::{BlockHash, Timestamp};

use crate::block::Block;
use crate::error::LedgerError;

/// Build the unsealed genesis block for `slate` at `timestamp`.
pub fn create_genesis_block(slate: &[String], timestamp: Timestamp) -> Block {
    Block {
        index: 1,
        timestamp,
        prev_hash: BlockHash::ZERO,
        transactions: Vec::new(),
        candidate_slate: slate.to_vec(),
        nonce: 0,
    }
}

/// A slate must name at least one candidate, each exactly once.
pub fn validate_slate(slate: &[String]) -> Result<(), LedgerError> {
    if slate.is_empty() {
        return Err(LedgerError::EmptySlate);
    }
    let mut seen = HashSet::with_capacity(slate.len());
    for candidate in slate {
        if !seen.insert(candidate.as_str()) {
            return Err(LedgerError::DuplicateCandidate(candidate.clone()));
        }
    }
    Ok(())
}
