use ballot_work::WorkError;
use thiserror::Error;

/// Rejections from [`crate::Ledger::record_vote`] and ledger construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("voter {voter_id} has already voted")]
    AlreadyVoted { voter_id: String },

    #[error("candidate {candidate:?} is not on the slate")]
    InvalidCandidate { candidate: String },

    #[error("voter id must not be empty")]
    InvalidVoterId,

    #[error("candidate slate must not be empty")]
    EmptySlate,

    #[error("candidate {0:?} appears more than once on the slate")]
    DuplicateCandidate(String),

    #[error("gave up after {attempts} attempts: chain tip kept moving")]
    Contended { attempts: u32 },

    #[error("proof-of-work failed: {0}")]
    Work(#[from] WorkError),
}

/// A tamper or corruption finding from chain verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("block {index}: stored hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("block {index}: digest does not meet the proof-of-work difficulty")]
    InsufficientWork { index: u64 },

    #[error("block {index}: prev_hash does not match the preceding block's digest")]
    BrokenLink { index: u64 },

    #[error("block {index}: expected index {expected}")]
    IndexGap { index: u64, expected: u64 },
}
