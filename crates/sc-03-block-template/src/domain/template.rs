//! Template produced by a build and the inputs needed to seal it into a
//! block.

use super::context::{Accumulators, BuyBackFromInfo, TxGroups};
use super::stability::StabilityParams;
use sc_01_block_model::CrossOutputCoin;
use shared_types::{Hash, PublicKey, ShardId};

/// Result of selecting and classifying pending transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    /// Shard the template is for.
    pub shard_id: ShardId,
    /// Height of the block being built.
    pub height: u64,
    /// Hash of the parent block.
    pub prev_block_hash: Hash,
    /// Parameters the admission checks ran against.
    pub params: StabilityParams,
    /// Classified transactions.
    pub groups: TxGroups,
    /// Totals.
    pub acc: Accumulators,
    /// Buy-backs the treasury owes.
    pub buy_backs: Vec<BuyBackFromInfo>,
}

impl BlockTemplate {
    /// Treasury balance once this block is applied.
    ///
    /// Income and fees are added; buy-back payouts and dividends are
    /// subtracted, floored at zero.
    pub fn salary_fund_after(&self) -> u64 {
        let paid_back: u64 = self
            .buy_backs
            .iter()
            .fold(0u64, |sum, info| sum.saturating_add(info.payout()));
        self.params
            .salary_fund
            .saturating_add(self.acc.income_from_bonds)
            .saturating_add(self.acc.total_fee)
            .saturating_sub(paid_back)
            .saturating_sub(self.acc.bank_payout_amount)
            .saturating_sub(self.acc.gov_payout_amount)
    }
}

/// Everything besides the template needed to seal a shard block.
#[derive(Debug, Clone, Default)]
pub struct BlockDraft {
    /// Producer key written into the header.
    pub producer: PublicKey,
    /// Unix seconds.
    pub timestamp: i64,
    /// Beacon epoch.
    pub epoch: u64,
    /// Committee that will sign the block.
    pub committee: Vec<PublicKey>,
    /// Anchored beacon height.
    pub beacon_height: u64,
    /// Anchored beacon hash.
    pub beacon_hash: Hash,
    /// Protocol instructions carried in the body.
    pub instructions: Vec<Vec<String>>,
    /// Candidate inbound bundles for this shard.
    pub inbound: Vec<CrossOutputCoin>,
}
