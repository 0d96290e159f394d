//! # Inbound Ports
//!
//! API trait defining what the template generator can do.

use crate::domain::{BlockDraft, BlockTemplate, BuyBackFromInfo};
use crate::error::TemplateResult;
use sc_01_block_model::{ShardBlock, Transaction};
use shared_types::{PublicKey, ShardId};

/// Block template generator API - inbound port.
pub trait BlockTemplateApi: Send + Sync {
    /// Select, validate and classify pending transactions for the next
    /// block of `shard_id`, then append treasury payouts.
    fn build_template(
        &self,
        pending: &[Transaction],
        shard_id: ShardId,
        producer: &PublicKey,
    ) -> TemplateResult<BlockTemplate>;

    /// Salary transactions paying admitted buy-backs.
    fn buy_back_payout_txs(
        &self,
        infos: &[BuyBackFromInfo],
        producer: &PublicKey,
    ) -> Vec<Transaction>;

    /// Seal a template into an unsigned shard block with every root filled.
    fn assemble_block(&self, template: BlockTemplate, draft: BlockDraft) -> ShardBlock;
}
