//! Proof-of-work for vote blocks.
//!
//! A block is sealed once the SHA3-256 digest of its canonical encoding has a
//! configured number of leading zero hex characters. The nonce is the last
//! field of that encoding, so the search hashes a fixed prefix followed by the
//! decimal nonce. Difficulty paces block production; it is not a security
//! boundary.

pub mod cancel;
pub mod difficulty;
pub mod error;
pub mod generator;
pub mod validator;

pub use cancel::CancelToken;
pub use difficulty::WorkDifficulty;
pub use error::WorkError;
pub use generator::WorkGenerator;
pub use validator::{hash_with_nonce, validate_work};

use ballot_types::BlockHash;

/// A nonce together with the digest it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkSolution {
    pub nonce: u64,
    pub hash: BlockHash,
}
