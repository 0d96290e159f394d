//! # Dividend Builder
//!
//! Treasury sub-builder paying stablecoin-bank and government token holders
//! at fixed height intervals, on a single configured shard. Crowdsale and
//! refund settlement keep the no-op defaults of [`TreasuryProcessors`].

use crate::config::DividendConfig;
use crate::domain::salary_payout;
use crate::error::SubBuildError;
use crate::ports::{SubBuild, TokenHolderSource, TreasuryProcessors, TreasuryRequest};
use sc_01_block_model::{DividendPayout, Metadata, DCB_TOKEN_ID, GOV_TOKEN_ID};
use shared_types::{Hash, ShardId};
use std::sync::Arc;
use tracing::debug;

/// Dividend payouts from a holder table.
pub struct DividendBuilder {
    config: DividendConfig,
    holders: Arc<dyn TokenHolderSource>,
}

impl DividendBuilder {
    /// Builder paying per `config` from `holders`.
    pub fn new(config: DividendConfig, holders: Arc<dyn TokenHolderSource>) -> Self {
        Self { config, holders }
    }

    /// Whether a block at `height` pays dividends.
    pub fn is_payout_height(&self, height: u64) -> bool {
        self.config.enabled
            && self.config.payout_frequency > 0
            && height % self.config.payout_frequency == 0
    }

    /// Whether blocks of `shard_id` carry payouts.
    pub fn is_paying_shard(&self, shard_id: ShardId) -> bool {
        shard_id == self.config.paying_shard
    }

    fn payout(&self, token_id: Hash, req: &TreasuryRequest<'_>) -> Result<SubBuild, SubBuildError> {
        if !self.is_paying_shard(req.shard_id) || !self.is_payout_height(req.height) {
            return Ok(SubBuild::default());
        }

        let holdings = self.holders.holdings(&token_id)?;
        if holdings.holders.is_empty() {
            return Ok(SubBuild::default());
        }
        if holdings.total_supply == 0 {
            return Err(SubBuildError::ZeroSupply);
        }

        let mut build = SubBuild::default();
        for (holder, balance) in &holdings.holders {
            if build.transactions.len() >= self.config.max_payouts_per_block {
                break;
            }
            let share = u128::from(holdings.payout_pool) * u128::from(*balance)
                / u128::from(holdings.total_supply);
            let amount = u64::try_from(share).unwrap_or(u64::MAX);
            if amount == 0 {
                continue;
            }
            build.transactions.push(salary_payout(
                req.producer,
                holder,
                amount,
                Metadata::Dividend(DividendPayout {
                    token_id,
                    payout_id: req.height,
                }),
            ));
            build.payout = build.payout.saturating_add(amount);
        }

        debug!(
            height = req.height,
            payouts = build.transactions.len(),
            total = build.payout,
            "[sc-03] Dividend payout built"
        );
        Ok(build)
    }
}

impl TreasuryProcessors for DividendBuilder {
    fn bank_dividend(&self, req: &TreasuryRequest<'_>) -> Result<SubBuild, SubBuildError> {
        self.payout(DCB_TOKEN_ID, req)
    }

    fn gov_dividend(&self, req: &TreasuryRequest<'_>) -> Result<SubBuild, SubBuildError> {
        self.payout(GOV_TOKEN_ID, req)
    }
}
