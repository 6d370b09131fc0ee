use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    #[error("difficulty of {requested} leading zeros exceeds the maximum of {maximum}")]
    DifficultyTooHigh { requested: u32, maximum: u32 },

    #[error("work generation cancelled")]
    Cancelled,

    #[error("nonce space exhausted without meeting difficulty")]
    Exhausted,
}
