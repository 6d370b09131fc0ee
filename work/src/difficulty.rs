//! Leading-zero difficulty.

use ballot_types::BlockHash;

use crate::WorkError;

/// Required number of leading `'0'` hex characters in a sealed block's digest.
///
/// Each additional zero multiplies the expected number of attempts by 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDifficulty(u32);

impl WorkDifficulty {
    /// A 256-bit digest has 64 hex characters.
    pub const MAX_ZEROS: u32 = 64;

    /// Four zeros, about 65 536 attempts on average.
    pub const DEFAULT: Self = Self(4);

    /// No work; any digest qualifies.
    pub const NONE: Self = Self(0);

    pub fn new(leading_zeros: u32) -> Result<Self, WorkError> {
        if leading_zeros > Self::MAX_ZEROS {
            return Err(WorkError::DifficultyTooHigh {
                requested: leading_zeros,
                maximum: Self::MAX_ZEROS,
            });
        }
        Ok(Self(leading_zeros))
    }

    pub fn leading_zeros(&self) -> u32 {
        self.0
    }

    /// Whether `hash` satisfies this difficulty.
    pub fn is_met_by(&self, hash: &BlockHash) -> bool {
        hash.leading_zero_nibbles() >= self.0
    }

    /// Expected number of hash attempts to find a valid nonce.
    pub fn expected_attempts(&self) -> f64 {
        16f64.powi(self.0 as i32)
    }
}

impl Default for WorkDifficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}
