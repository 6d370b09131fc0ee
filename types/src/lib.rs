//! Fundamental types for the ballot ledger.
//!
//! Shared by every other crate in the workspace: block digests, timestamps
//! and the clock abstraction the ledger reads time through.

pub mod block;
pub mod time;

pub use block::{BlockHash, HashParseError};
pub use time::{Clock, SystemClock, Timestamp};
