//! Configuration types for the block template generator

use serde::{Deserialize, Serialize};
use shared_types::ShardId;

/// Default ceiling on mempool transactions admitted into one block.
pub const DEFAULT_MAX_TXS_IN_BLOCK: usize = 1_000;

/// Blocks between dividend payouts.
pub const DEFAULT_PAYOUT_FREQUENCY: u64 = 1_000;

/// Holders paid per block during a payout.
pub const DEFAULT_MAX_PAYOUTS_PER_BLOCK: usize = 1_000;

/// Runtime configuration for template generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Mempool transactions admitted per block. Treasury payouts appended
    /// after selection are not counted.
    pub max_txs_in_block: usize,

    /// Number of shards transactions and outputs are routed over.
    pub shard_count: u8,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            max_txs_in_block: DEFAULT_MAX_TXS_IN_BLOCK,
            shard_count: 4,
        }
    }
}

/// Settings of the [`DividendBuilder`](crate::DividendBuilder).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DividendConfig {
    /// Payouts are only built when enabled.
    pub enabled: bool,

    /// A payout happens at heights divisible by this value.
    pub payout_frequency: u64,

    /// Holders paid per payout block.
    pub max_payouts_per_block: usize,

    /// The one shard whose blocks carry payouts. Holder tables are global,
    /// so any other shard paying would pay the same holders again.
    pub paying_shard: ShardId,
}

impl Default for DividendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            payout_frequency: DEFAULT_PAYOUT_FREQUENCY,
            max_payouts_per_block: DEFAULT_MAX_PAYOUTS_PER_BLOCK,
            paying_shard: 0,
        }
    }
}
