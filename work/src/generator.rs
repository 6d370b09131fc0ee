//! PoW generation (multi-threaded CPU).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use ballot_crypto::{Digest, Sha3_256};
use rayon::prelude::*;

use crate::validator::finish_with_nonce;
use crate::{CancelToken, WorkDifficulty, WorkError, WorkSolution};

/// Searches for a nonce sealing a block, using all available CPU cores.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkGenerator;

/// Attempts per thread before checking the stop and cancellation flags.
const BATCH_SIZE: u64 = 4096;

impl WorkGenerator {
    /// Find a nonce, searching upward from `start_nonce`, whose digest over
    /// `prefix ‖ decimal(nonce)` meets `difficulty`.
    ///
    /// The nonce space is split across rayon threads by stride; the first
    /// thread to find a valid nonce signals the others to stop. Which valid
    /// nonce wins is not deterministic when several threads succeed together.
    pub fn generate(
        &self,
        prefix: &[u8],
        difficulty: WorkDifficulty,
        start_nonce: u64,
        cancel: &CancelToken,
    ) -> Result<WorkSolution, WorkError> {
        let mut primed = Sha3_256::new();
        primed.update(prefix);

        if difficulty == WorkDifficulty::NONE {
            return Ok(WorkSolution {
                nonce: start_nonce,
                hash: finish_with_nonce(&primed, start_nonce),
            });
        }

        let stop = AtomicBool::new(false);
        let found: Mutex<Option<WorkSolution>> = Mutex::new(None);
        let num_threads = rayon::current_num_threads().max(1) as u64;

        (0..num_threads).into_par_iter().for_each(|thread_id| {
            let Some(mut nonce) = start_nonce.checked_add(thread_id) else {
                return;
            };

            loop {
                if stop.load(Ordering::Relaxed) || cancel.is_cancelled() {
                    return;
                }

                for _ in 0..BATCH_SIZE {
                    let hash = finish_with_nonce(&primed, nonce);
                    if difficulty.is_met_by(&hash) {
                        let mut slot = found.lock().unwrap_or_else(|e| e.into_inner());
                        if slot.is_none() {
                            *slot = Some(WorkSolution { nonce, hash });
                        }
                        stop.store(true, Ordering::Relaxed);
                        return;
                    }
                    match nonce.checked_add(num_threads) {
                        Some(next) => nonce = next,
                        None => return,
                    }
                }
            }
        });

        let solution = found.into_inner().unwrap_or_else(|e| e.into_inner());
        match solution {
            Some(solution) => {
                tracing::trace!(
                    nonce = solution.nonce,
                    hash = %solution.hash,
                    "proof-of-work found"
                );
                Ok(solution)
            }
            None if cancel.is_cancelled() => Err(WorkError::Cancelled),
            None => Err(WorkError::Exhausted),
        }
    }
}
