//! Quorum threshold.

use serde::{Deserialize, Serialize};

/// How many matching votes finalize a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    /// `n - f` votes, where `f = (n - 1) / 3` faulty members are tolerated.
    #[default]
    Byzantine,
    /// A fixed vote count, capped at the committee size.
    Fixed(usize),
}

impl QuorumRule {
    /// Votes required for a committee of `committee_size`.
    pub fn threshold(&self, committee_size: usize) -> usize {
        if committee_size == 0 {
            return 0;
        }
        match self {
            QuorumRule::Byzantine => committee_size - (committee_size - 1) / 3,
            QuorumRule::Fixed(k) => (*k).clamp(1, committee_size),
        }
    }
}
