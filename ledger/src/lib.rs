//! Append-only vote ledger.
//!
//! A single chain of sealed blocks: a genesis block carrying the candidate
//! slate, then one block per recorded vote. Each block commits to the digest
//! of its predecessor and carries a proof-of-work nonce. The ledger also owns
//! the running tally and the set of voters who have already voted.

pub mod block;
pub mod error;
pub mod genesis;
pub mod integrity;
pub mod ledger;
pub mod tally;

pub use block::{Block, SealedBlock, Transaction, GENESIS_PREV_HASH, TRANSACTION_SEPARATOR};
pub use error::{IntegrityError, LedgerError};
pub use genesis::{create_genesis_block, validate_slate};
pub use integrity::verify_blocks;
pub use ledger::{Ledger, MAX_COMMIT_ATTEMPTS};
pub use tally::Tally;
