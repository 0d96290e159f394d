//! Build context: classification groups, accumulators and buy-back records
//! threaded through one template build.

use super::stability::StabilityParams;
use sc_01_block_model::Transaction;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, PublicKey, ShardId};

/// Running totals of one build. Every admission check reads and advances
/// these; nothing else does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Accumulators {
    /// Bonds sold from the treasury.
    pub bonds_sold: u64,
    /// Stablecoin-bank tokens issued against deposits.
    pub dcb_tokens_sold: u64,
    /// Native coin received for bonds.
    pub income_from_bonds: u64,
    /// Fees of admitted mempool transactions.
    pub total_fee: u64,
    /// Treasury funds committed to buy-backs.
    pub buy_back_coins: u64,
    /// Bank dividend paid.
    pub bank_payout_amount: u64,
    /// Government dividend paid.
    pub gov_payout_amount: u64,
}

/// Transactions sorted by the build.
///
/// `txs_to_add` is the block's transaction list in order. The typed groups
/// are subsets of it that later block stages process separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxGroups {
    /// Admitted transactions followed by treasury payouts.
    pub txs_to_add: Vec<Transaction>,
    /// Transactions rejected by validation or admission.
    pub txs_to_remove: Vec<Transaction>,
    /// Subset of `txs_to_remove` that failed self or metadata validation.
    /// Unlike admission rejects these never become admissible, so the
    /// mempool may drop them.
    pub txs_to_evict: Vec<Transaction>,
    /// Admitted bond purchases.
    pub buy_sell_reqs: Vec<Transaction>,
    /// Admitted issuance requests.
    pub issuing_reqs: Vec<Transaction>,
    /// Admitted oracle board updates.
    pub oracle_updates: Vec<Transaction>,
    /// Admitted multisig registrations.
    pub multisig_registrations: Vec<Transaction>,
}

/// Buy-back admitted in this build, to be paid by the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyBackFromInfo {
    /// Receiver of the payout.
    pub payment_address: PublicKey,
    /// Unit price from the original sale response.
    pub buy_back_price: u64,
    /// Quantity sold back.
    pub value: u64,
    /// Hash of the buy-back request transaction.
    pub requested_tx_id: Hash,
}

impl BuyBackFromInfo {
    /// Native coin owed for this buy-back.
    pub fn payout(&self) -> u64 {
        self.buy_back_price.saturating_mul(self.value)
    }
}

/// Mutable state of a single build, passed by reference to every check.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Shard the template is for.
    pub shard_id: ShardId,
    /// Height of the block being built.
    pub next_height: u64,
    /// Treasury and oracle parameters at the parent block.
    pub params: StabilityParams,
    /// Running totals.
    pub acc: Accumulators,
    /// Classification.
    pub groups: TxGroups,
    /// Buy-backs admitted so far.
    pub buy_backs: Vec<BuyBackFromInfo>,
}

impl BuildContext {
    /// Fresh context for a block at `next_height`.
    pub fn new(shard_id: ShardId, next_height: u64, params: StabilityParams) -> Self {
        Self {
            shard_id,
            next_height,
            params,
            acc: Accumulators::default(),
            groups: TxGroups::default(),
            buy_backs: Vec::new(),
        }
    }
}
