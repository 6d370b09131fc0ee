//! PoW validation.

use ballot_crypto::{sha3_256_multi, Digest, Sha3_256};
use ballot_types::BlockHash;

use crate::WorkDifficulty;

/// Digest of a canonical block prefix followed by the decimal `nonce`.
pub fn hash_with_nonce(prefix: &[u8], nonce: u64) -> BlockHash {
    let mut buf = [0u8; 20];
    BlockHash::new(sha3_256_multi(&[prefix, decimal(nonce, &mut buf)]))
}

/// Validate that `nonce` seals the block whose canonical prefix is `prefix`.
pub fn validate_work(prefix: &[u8], nonce: u64, difficulty: WorkDifficulty) -> bool {
    difficulty.is_met_by(&hash_with_nonce(prefix, nonce))
}

/// Hash the nonce into a hasher already primed with the block prefix.
pub(crate) fn finish_with_nonce(primed: &Sha3_256, nonce: u64) -> BlockHash {
    let mut buf = [0u8; 20];
    let mut hasher = primed.clone();
    hasher.update(decimal(nonce, &mut buf));
    BlockHash::new(hasher.finalize().into())
}

/// Render `n` in decimal into `buf`, returning the used tail.
pub(crate) fn decimal(mut n: u64, buf: &mut [u8; 20]) -> &[u8] {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[i..]
}
