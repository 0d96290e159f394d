//! Configuration types for the consensus engine

use crate::domain::{NodeMode, QuorumRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for the consensus engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Chains this node takes part in.
    pub node_mode: NodeMode,

    /// Number of shard chains.
    pub shard_count: u8,

    /// Blocks per epoch.
    pub epoch_length: u64,

    /// Votes needed to finalize.
    pub quorum: QuorumRule,

    /// Worker loop intervals.
    pub timings: Timings,

    /// Messages buffered for the worker before delivery fails.
    pub mailbox_capacity: usize,

    /// Future-height messages kept while an earlier round runs.
    pub stash_capacity: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            node_mode: NodeMode::Auto,
            shard_count: 4,
            epoch_length: 100,
            quorum: QuorumRule::default(),
            timings: Timings::default(),
            mailbox_capacity: 1_024,
            stash_capacity: 256,
        }
    }
}

impl ConsensusConfig {
    /// Short intervals for tests.
    pub fn for_testing() -> Self {
        Self {
            timings: Timings::for_testing(),
            mailbox_capacity: 256,
            stash_capacity: 64,
            ..Self::default()
        }
    }
}

/// Named intervals of the worker loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timings {
    /// Wait between readiness checks while the chain syncs.
    pub readiness_poll: Duration,

    /// Wait after the chain reports ready, before reading committees.
    pub settle_delay: Duration,

    /// Wait after a pass in which the node held no role.
    pub idle_after_no_role: Duration,

    /// Time a round may take before it is abandoned.
    pub round_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            readiness_poll: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            idle_after_no_role: Duration::from_secs(5),
            round_timeout: Duration::from_secs(30),
        }
    }
}

impl Timings {
    /// Millisecond-scale intervals for tests.
    pub fn for_testing() -> Self {
        Self {
            readiness_poll: Duration::from_millis(10),
            settle_delay: Duration::from_millis(5),
            idle_after_no_role: Duration::from_millis(50),
            round_timeout: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_longer_than_settle() {
        let t = Timings::default();
        assert!(t.idle_after_no_role > t.settle_delay);
        let t = Timings::for_testing();
        assert!(t.idle_after_no_role > t.settle_delay);
    }

    #[test]
    fn test_testing_config_keeps_topology() {
        let config = ConsensusConfig::for_testing();
        assert_eq!(config.shard_count, ConsensusConfig::default().shard_count);
        assert!(config.timings.round_timeout < Timings::default().round_timeout);
    }
}
