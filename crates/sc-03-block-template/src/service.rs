//! # Block Template Generator Service
//!
//! Walks the mempool in order, filters by shard, validates, dispatches the
//! per-metadata admission check and stops at the transaction ceiling. The
//! treasury sub-builders then append their payouts.

use crate::config::TemplateConfig;
use crate::domain::{
    buy_back_payout_txs, check_admission, Admission, BlockDraft, BlockTemplate, BuildContext,
    BuyBackFromInfo,
};
use crate::error::{TemplateError, TemplateResult};
use crate::ports::{
    BlockTemplateApi, MetadataValidator, TemplateChainReader, TreasuryProcessors,
    TreasuryRequest, TxVerifier,
};
use sc_01_block_model::{
    merkle_root_keys, seal_shard_roots, FinalityProof, ShardBlock, ShardBody, ShardHeader,
    Transaction,
};
use sc_02_cross_shard::{seal_outbound_commitments, CrossShardRelayApi};
use shared_types::{hash_to_hex, Hash, PublicKey, ShardId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Block template generator.
pub struct BlockTemplateGenerator {
    config: TemplateConfig,
    chain: Arc<dyn TemplateChainReader>,
    verifier: Arc<dyn TxVerifier>,
    metadata: Arc<dyn MetadataValidator>,
    treasury: Arc<dyn TreasuryProcessors>,
    relay: Arc<dyn CrossShardRelayApi>,
}

impl BlockTemplateGenerator {
    /// Create a generator over its collaborators.
    pub fn new(
        config: TemplateConfig,
        chain: Arc<dyn TemplateChainReader>,
        verifier: Arc<dyn TxVerifier>,
        metadata: Arc<dyn MetadataValidator>,
        treasury: Arc<dyn TreasuryProcessors>,
        relay: Arc<dyn CrossShardRelayApi>,
    ) -> Self {
        info!(
            max_txs = config.max_txs_in_block,
            shards = config.shard_count,
            "[sc-03] Initializing block template generator"
        );
        Self {
            config,
            chain,
            verifier,
            metadata,
            treasury,
            relay,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Transaction verifier, shared with block validation.
    pub fn verifier(&self) -> Arc<dyn TxVerifier> {
        Arc::clone(&self.verifier)
    }

    /// Chain view the generator reads.
    pub fn chain(&self) -> Arc<dyn TemplateChainReader> {
        Arc::clone(&self.chain)
    }

    fn reject(ctx: &mut BuildContext, tx: &Transaction, reason: &str) {
        warn!(
            shard = ctx.shard_id,
            height = ctx.next_height,
            tx = %hash_to_hex(&tx.hash()),
            "[sc-03] Transaction rejected: {}", reason
        );
        ctx.groups.txs_to_remove.push(tx.clone());
    }

    fn invalidate(ctx: &mut BuildContext, tx: &Transaction, reason: &str) {
        Self::reject(ctx, tx, reason);
        ctx.groups.txs_to_evict.push(tx.clone());
    }

    fn admit(ctx: &mut BuildContext, tx: &Transaction, admission: Admission) {
        match admission {
            Admission::Plain => {}
            Admission::BuySell => ctx.groups.buy_sell_reqs.push(tx.clone()),
            Admission::BuyBack(info) => ctx.buy_backs.push(info),
            Admission::Issuing => ctx.groups.issuing_reqs.push(tx.clone()),
            Admission::OracleUpdate => ctx.groups.oracle_updates.push(tx.clone()),
            Admission::MultiSig => ctx.groups.multisig_registrations.push(tx.clone()),
        }
        ctx.acc.total_fee = ctx.acc.total_fee.saturating_add(tx.fee());
        ctx.groups.txs_to_add.push(tx.clone());
    }

    /// Run the sub-builders in their fixed order and append their output.
    /// Payouts are appended after the ceiling check and are not counted.
    fn append_treasury(
        &self,
        ctx: &mut BuildContext,
        pending: &[Transaction],
        producer: &PublicKey,
    ) -> TemplateResult<()> {
        let req = TreasuryRequest {
            shard_id: ctx.shard_id,
            height: ctx.next_height,
            producer,
            pending,
        };

        let bank = self
            .treasury
            .bank_dividend(&req)
            .map_err(|source| TemplateError::SubBuilder {
                builder: "bank_dividend",
                source,
            })?;
        ctx.acc.bank_payout_amount = bank.payout;
        ctx.groups.txs_to_add.extend(bank.transactions);

        let gov = self
            .treasury
            .gov_dividend(&req)
            .map_err(|source| TemplateError::SubBuilder {
                builder: "gov_dividend",
                source,
            })?;
        ctx.acc.gov_payout_amount = gov.payout;
        ctx.groups.txs_to_add.extend(gov.transactions);

        let sale = self
            .treasury
            .crowdsale(&req)
            .map_err(|source| TemplateError::SubBuilder {
                builder: "crowdsale",
                source,
            })?;
        ctx.groups.txs_to_add.extend(sale.sale);
        ctx.groups.txs_to_add.extend(sale.removable);

        let refunds = self
            .treasury
            .committee_refunds(&req)
            .map_err(|source| TemplateError::SubBuilder {
                builder: "committee_refunds",
                source,
            })?;
        ctx.groups.txs_to_add.extend(refunds);

        Ok(())
    }
}

impl BlockTemplateApi for BlockTemplateGenerator {
    #[tracing::instrument(skip(self, pending, producer), fields(pending = pending.len()))]
    fn build_template(
        &self,
        pending: &[Transaction],
        shard_id: ShardId,
        producer: &PublicKey,
    ) -> TemplateResult<BlockTemplate> {
        let best = self
            .chain
            .best_shard_header(shard_id)
            .ok_or(TemplateError::NoBestBlock(shard_id))?;
        let mut ctx = BuildContext::new(
            shard_id,
            best.height + 1,
            self.chain.stability_params(shard_id),
        );

        let chain = self.chain.as_ref();
        let db = chain.database();
        let prior_tx = |hash: &Hash| chain.transaction_by_hash(hash);
        let cap = self.config.max_txs_in_block;

        for tx in pending {
            if ctx.groups.txs_to_add.len() >= cap {
                debug!(cap, "[sc-03] Transaction ceiling reached");
                break;
            }
            if tx.shard_id(self.config.shard_count) != shard_id {
                continue;
            }

            if !self
                .verifier
                .validate_by_itself(tx, tx.is_privacy(), db.as_ref(), chain, shard_id)
            {
                Self::invalidate(&mut ctx, tx, "self-validation failed");
                continue;
            }
            if tx.metadata().is_some()
                && !self.metadata.validate_before_new_block(tx, chain, shard_id)
            {
                Self::invalidate(&mut ctx, tx, "metadata validation failed");
                continue;
            }

            match check_admission(tx, &mut ctx, &prior_tx) {
                Ok(admission) => Self::admit(&mut ctx, tx, admission),
                Err(e) => Self::reject(&mut ctx, tx, &e.to_string()),
            }
        }

        let selected = ctx.groups.txs_to_add.len();
        self.append_treasury(&mut ctx, pending, producer)?;

        info!(
            shard = shard_id,
            height = ctx.next_height,
            selected,
            appended = ctx.groups.txs_to_add.len() - selected,
            rejected = ctx.groups.txs_to_remove.len(),
            total_fee = ctx.acc.total_fee,
            "[sc-03] Template built"
        );

        Ok(BlockTemplate {
            shard_id,
            height: ctx.next_height,
            prev_block_hash: best.hash(),
            params: ctx.params,
            groups: ctx.groups,
            acc: ctx.acc,
            buy_backs: ctx.buy_backs,
        })
    }

    fn buy_back_payout_txs(
        &self,
        infos: &[BuyBackFromInfo],
        producer: &PublicKey,
    ) -> Vec<Transaction> {
        buy_back_payout_txs(infos, producer)
    }

    fn assemble_block(&self, template: BlockTemplate, draft: BlockDraft) -> ShardBlock {
        let shard_count = self.config.shard_count;
        let salary_fund = template.salary_fund_after();
        let shard_id = template.shard_id;

        let mut transactions = template.groups.txs_to_add;
        transactions.extend(buy_back_payout_txs(&template.buy_backs, &draft.producer));

        let cross_output_coins = draft
            .inbound
            .into_iter()
            .filter(|bundle| bundle.shard_id == shard_id)
            .filter(|bundle| match self.relay.verify_inbound(bundle) {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        shard = shard_id,
                        source = %hash_to_hex(&bundle.block_hash),
                        "[sc-03] Dropping inbound bundle: {}", e
                    );
                    false
                }
            })
            .collect();

        let body = ShardBody {
            instructions: draft.instructions,
            cross_output_coins,
            transactions,
        };

        let mut header = ShardHeader::new(
            shard_id,
            draft.producer,
            template.height,
            template.prev_block_hash,
        );
        header.timestamp = draft.timestamp;
        header.epoch = draft.epoch;
        header.salary_fund = salary_fund;
        header.committee_root = merkle_root_keys(&draft.committee);
        header.beacon_height = draft.beacon_height;
        header.beacon_hash = draft.beacon_hash;
        seal_shard_roots(&mut header, &body, shard_count);
        seal_outbound_commitments(&mut header, &body, shard_count);

        debug!(
            shard = shard_id,
            height = header.height,
            txs = body.transactions.len(),
            inbound = body.cross_output_coins.len(),
            "[sc-03] Block assembled"
        );

        ShardBlock {
            header,
            body,
            producer_sig: Vec::new(),
            proof: FinalityProof::default(),
            parent_proof: FinalityProof::default(),
        }
    }
}
