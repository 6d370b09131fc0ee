//! Cryptographic primitives for the ballot ledger.
//!
//! - **SHA3-256** for block digests and credential derivation
//! - **HMAC-SHA-256** for the challenge-response proof
//! - Constant-time comparison and OS-random hex tokens (salts, challenges)

pub mod hash;
pub mod mac;
pub mod random;

pub use hash::{sha3_256, sha3_256_multi, Digest, Sha3_256};
pub use mac::{constant_time_eq, hmac_sha256, hmac_sha256_hex, verify_hmac_sha256};
pub use random::{OsRandom, RandomSource};
