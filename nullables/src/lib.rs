//! Nullable infrastructure for deterministic testing.
//!
//! External sources of nondeterminism (wall clock, OS randomness) sit behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod random;

pub use clock::NullClock;
pub use random::NullRandom;
