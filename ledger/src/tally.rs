//! Per-candidate vote counts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Vote counts keyed by candidate, in slate order.
///
/// Every slate candidate is present from construction, starting at zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(IndexMap<String, u64>);

impl Tally {
    pub fn new(slate: &[String]) -> Self {
        Self(slate.iter().map(|c| (c.clone(), 0)).collect())
    }

    /// Count for `candidate`, zero if it is not on the slate.
    pub fn get(&self, candidate: &str) -> u64 {
        self.0.get(candidate).copied().unwrap_or(0)
    }

    /// Total votes across all candidates.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(c, n)| (c.as_str(), *n))
    }

    pub fn as_map(&self) -> &IndexMap<String, u64> {
        &self.0
    }

    /// Returns false if `candidate` is not on the slate.
    pub(crate) fn increment(&mut self, candidate: &str) -> bool {
        match self.0.get_mut(candidate) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }
}
