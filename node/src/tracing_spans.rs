//! Pre-built [`tracing::Span`] constructors for election operations.
//!
//! Consistent span names and field sets make it easy to filter and
//! correlate a voter's login, vote and the mining it triggers.

use tracing::{info_span, Span};

/// Span covering one vote submission, from token to sealed block.
pub fn vote_span(voter_id: &str, candidate_index: usize) -> Span {
    info_span!("vote", voter = %voter_id, candidate_index)
}

/// Span covering password check and challenge-response handshake.
pub fn login_span(voter_id: &str) -> Span {
    info_span!("login", voter = %voter_id)
}

/// Span covering the proof-of-work search for one block.
pub fn mine_span(difficulty: u32) -> Span {
    info_span!("mine", difficulty)
}
