//! Chain integrity verification.
//!
//! Findings are reported, never repaired: the chain is append-only.

use ballot_work::WorkDifficulty;

use crate::block::SealedBlock;
use crate::error::IntegrityError;

/// Check a block sequence for tampering.
///
/// For each block: the stored hash must equal the recomputed digest and meet
/// `difficulty`; the first block must be index 1 with the genesis placeholder
/// link; every later block must follow its predecessor by one index and
/// store the predecessor's recomputed digest as `prev_hash`. Returns the
/// first violation found.
pub fn verify_blocks(
    blocks: &[SealedBlock],
    difficulty: WorkDifficulty,
) -> Result<(), IntegrityError> {
    let mut previous: Option<&SealedBlock> = None;

    for sealed in blocks {
        let index = sealed.block.index;

        let recomputed = sealed.block.compute_hash();
        if recomputed != sealed.hash {
            return Err(IntegrityError::HashMismatch { index });
        }
        if !difficulty.is_met_by(&recomputed) {
            return Err(IntegrityError::InsufficientWork { index });
        }

        match previous {
            None => {
                if index != 1 {
                    return Err(IntegrityError::IndexGap { index, expected: 1 });
                }
                if !sealed.block.prev_hash.is_zero() {
                    return Err(IntegrityError::BrokenLink { index });
                }
            }
            Some(prev) => {
                let expected = prev.block.index + 1;
                if index != expected {
                    return Err(IntegrityError::IndexGap { index, expected });
                }
                if sealed.block.prev_hash != prev.block.compute_hash() {
                    return Err(IntegrityError::BrokenLink { index });
                }
            }
        }

        previous = Some(sealed);
    }

    Ok(())
}
