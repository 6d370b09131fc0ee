//! Vote transactions, blocks and their canonical hashing encoding.
//!
//! The canonical encoding concatenates, with no delimiters between fields:
//! `index`, `timestamp` (decimal seconds), `prev_hash` (hex, or `"0"` for
//! genesis), each transaction as `voter_id:candidate_choice`, each slate
//! entry in order, and finally `nonce`. Any change here breaks every
//! previously computed block hash.

use ballot_types::{BlockHash, Timestamp};
use ballot_work::hash_with_nonce;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between voter and choice inside one encoded transaction.
pub const TRANSACTION_SEPARATOR: char = ':';

/// Encoding of the genesis block's `prev_hash`.
pub const GENESIS_PREV_HASH: &str = "0";

/// One voter's choice.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub voter_id: String,
    pub candidate_choice: String,
}

impl Transaction {
    pub fn new(voter_id: impl Into<String>, candidate_choice: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            candidate_choice: candidate_choice.into(),
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.voter_id.as_bytes());
        let mut sep = [0u8; 4];
        out.extend_from_slice(TRANSACTION_SEPARATOR.encode_utf8(&mut sep).as_bytes());
        out.extend_from_slice(self.candidate_choice.as_bytes());
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Voter ID: {}, Vote for Candidate: {}",
            self.voter_id, self.candidate_choice
        )
    }
}

/// A block before or during sealing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, 1 for genesis.
    pub index: u64,
    pub timestamp: Timestamp,
    /// Digest of the preceding sealed block ([`BlockHash::ZERO`] for genesis).
    pub prev_hash: BlockHash,
    /// Empty for genesis, exactly one vote otherwise.
    pub transactions: Vec<Transaction>,
    pub candidate_slate: Vec<String>,
    pub nonce: u64,
}

impl Block {
    /// Canonical encoding of every field except `nonce`.
    ///
    /// The nonce is the final field, so a miner hashes this prefix once and
    /// appends each candidate nonce.
    pub fn canonical_prefix(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        out.extend_from_slice(self.index.to_string().as_bytes());
        out.extend_from_slice(self.timestamp.as_secs().to_string().as_bytes());
        if self.prev_hash.is_zero() {
            out.extend_from_slice(GENESIS_PREV_HASH.as_bytes());
        } else {
            out.extend_from_slice(self.prev_hash.to_hex().as_bytes());
        }
        for tx in &self.transactions {
            tx.encode_into(&mut out);
        }
        for candidate in &self.candidate_slate {
            out.extend_from_slice(candidate.as_bytes());
        }
        out
    }

    /// Full canonical encoding, nonce included.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = self.canonical_prefix();
        out.extend_from_slice(self.nonce.to_string().as_bytes());
        out
    }

    /// SHA3-256 digest of the canonical encoding.
    pub fn compute_hash(&self) -> BlockHash {
        hash_with_nonce(&self.canonical_prefix(), self.nonce)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
    }
}

/// A block whose nonce satisfies the ledger difficulty, with the digest it committed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBlock {
    #[serde(flatten)]
    pub block: Block,
    pub hash: BlockHash,
}

impl SealedBlock {
    pub fn index(&self) -> u64 {
        self.block.index
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.block.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_crypto::sha3_256;

    fn vote_block() -> Block {
        Block {
            index: 2,
            timestamp: Timestamp::new(1_700_000_000),
            prev_hash: BlockHash::new([0xab; 32]),
            transactions: vec![Transaction::new("alice", "Candidate A")],
            candidate_slate: vec!["Candidate A".into(), "Candidate B".into()],
            nonce: 77,
        }
    }

    #[test]
    fn canonical_encoding_field_order() {
        let expected = format!(
            "21700000000{}alice:Candidate ACandidate ACandidate B77",
            "ab".repeat(32)
        );
        assert_eq!(vote_block().canonical_bytes(), expected.as_bytes());
    }

    #[test]
    fn genesis_encodes_prev_hash_as_zero_literal() {
        let genesis = Block {
            index: 1,
            timestamp: Timestamp::new(5),
            prev_hash: BlockHash::ZERO,
            transactions: vec![],
            candidate_slate: vec!["X".into()],
            nonce: 3,
        };
        assert_eq!(genesis.canonical_bytes(), b"150X3");
        assert!(genesis.is_genesis());
    }

    #[test]
    fn compute_hash_is_digest_of_canonical_bytes() {
        let block = vote_block();
        assert_eq!(
            block.compute_hash().as_bytes(),
            &sha3_256(&block.canonical_bytes())
        );
    }

    #[test]
    fn any_field_change_changes_hash() {
        let base = vote_block();
        let original = base.compute_hash();

        let mut changed = base.clone();
        changed.nonce += 1;
        assert_ne!(changed.compute_hash(), original);

        let mut changed = base.clone();
        changed.transactions[0].candidate_choice = "Candidate B".into();
        assert_ne!(changed.compute_hash(), original);

        let mut changed = base;
        changed.timestamp = Timestamp::new(1_700_000_001);
        assert_ne!(changed.compute_hash(), original);
    }

    #[test]
    fn transaction_display() {
        let tx = Transaction::new("bob", "Candidate C");
        assert_eq!(tx.to_string(), "Voter ID: bob, Vote for Candidate: Candidate C");
    }
}
