//! Nullable random: deterministic byte streams for salts and challenges.

use std::sync::Mutex;

use ballot_crypto::RandomSource;

/// A deterministic random source for testing.
///
/// Each `fill` call consumes the next configured pattern, cycling when the
/// list runs out. A pattern shorter than the requested buffer is repeated.
pub struct NullRandom {
    outputs: Vec<Vec<u8>>,
    index: Mutex<usize>,
}

impl NullRandom {
    /// Create with a sequence of deterministic outputs.
    pub fn new(outputs: Vec<Vec<u8>>) -> Self {
        Self {
            outputs,
            index: Mutex::new(0),
        }
    }

    /// Every call fills the buffer with `byte`.
    pub fn constant(byte: u8) -> Self {
        Self::new(vec![vec![byte]])
    }

    /// Number of `fill` calls served so far.
    pub fn calls(&self) -> usize {
        *self.index.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RandomSource for NullRandom {
    fn fill(&self, buf: &mut [u8]) {
        let mut idx = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let current = *idx;
        *idx += 1;
        if self.outputs.is_empty() {
            buf.fill(0);
            return;
        }
        let pattern = &self.outputs[current % self.outputs.len()];
        if pattern.is_empty() {
            buf.fill(0);
            return;
        }
        for (dst, src) in buf.iter_mut().zip(pattern.iter().cycle()) {
            *dst = *src;
        }
    }
}
