//! OS-random tokens for salts, challenges and verifier bits.

use rand::rngs::OsRng;
use rand::RngCore;

/// Source of random bytes for salts and challenges.
///
/// Production code uses [`OsRandom`]; tests can substitute a deterministic
/// source so challenges and salts are predictable.
pub trait RandomSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]);

    /// `len` random bytes rendered as `2 * len` lowercase hex characters.
    fn hex(&self, len: usize) -> String {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf);
        hex::encode(buf)
    }
}

/// The operating system RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}
