//! # Outbound Ports
//!
//! Collaborators the generator calls into: chain state, transaction
//! validity, the metadata rule catalog and the treasury sub-builders.

use crate::domain::StabilityParams;
use crate::error::SubBuildError;
use parking_lot::RwLock;
use sc_01_block_model::{ShardHeader, Transaction};
use shared_types::{Hash, InMemoryStore, KeyValueStore, PublicKey, ShardId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Read-only chain view used while building a template.
pub trait TemplateChainReader: Send + Sync {
    /// Header of the best block of a shard.
    fn best_shard_header(&self, shard_id: ShardId) -> Option<ShardHeader>;

    /// Transaction already included on any shard.
    fn transaction_by_hash(&self, hash: &Hash) -> Option<Transaction>;

    /// Stability parameters in force at the shard's best block.
    fn stability_params(&self, shard_id: ShardId) -> StabilityParams;

    /// Node database handle.
    fn database(&self) -> Arc<dyn KeyValueStore>;
}

/// Transaction self-validation, including its opaque proof.
pub trait TxVerifier: Send + Sync {
    /// Whether the transaction proves its own validity.
    fn validate_by_itself(
        &self,
        tx: &Transaction,
        is_private: bool,
        db: &dyn KeyValueStore,
        chain: &dyn TemplateChainReader,
        shard_id: ShardId,
    ) -> bool;
}

/// Metadata rule catalog, consulted before a transaction enters a block.
pub trait MetadataValidator: Send + Sync {
    /// Whether the transaction's metadata allows it into the next block.
    fn validate_before_new_block(
        &self,
        tx: &Transaction,
        chain: &dyn TemplateChainReader,
        shard_id: ShardId,
    ) -> bool;
}

/// Inputs shared by every treasury sub-builder.
#[derive(Debug, Clone, Copy)]
pub struct TreasuryRequest<'a> {
    /// Shard being built.
    pub shard_id: ShardId,
    /// Height of the block being built.
    pub height: u64,
    /// Producer issuing the payouts.
    pub producer: &'a PublicKey,
    /// Mempool snapshot the build started from.
    pub pending: &'a [Transaction],
}

/// Output of a payout sub-builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubBuild {
    /// Transactions to append.
    pub transactions: Vec<Transaction>,
    /// Total paid by those transactions.
    pub payout: u64,
}

/// Output of the crowdsale sub-builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrowdsaleBuild {
    /// Sale transactions.
    pub sale: Vec<Transaction>,
    /// Refunds for sale requests that can no longer be served.
    pub removable: Vec<Transaction>,
}

/// Treasury sub-builders run after mempool selection.
///
/// Their transactions are appended without counting against the block's
/// transaction ceiling. Every method defaults to building nothing.
pub trait TreasuryProcessors: Send + Sync {
    /// Dividend to stablecoin-bank token holders.
    fn bank_dividend(&self, _req: &TreasuryRequest<'_>) -> Result<SubBuild, SubBuildError> {
        Ok(SubBuild::default())
    }

    /// Dividend to government token holders.
    fn gov_dividend(&self, _req: &TreasuryRequest<'_>) -> Result<SubBuild, SubBuildError> {
        Ok(SubBuild::default())
    }

    /// Crowdsale settlement.
    fn crowdsale(&self, _req: &TreasuryRequest<'_>) -> Result<CrowdsaleBuild, SubBuildError> {
        Ok(CrowdsaleBuild::default())
    }

    /// Refunds owed to committee members.
    fn committee_refunds(
        &self,
        _req: &TreasuryRequest<'_>,
    ) -> Result<Vec<Transaction>, SubBuildError> {
        Ok(Vec::new())
    }
}

/// Holdings of one token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenHoldings {
    /// Outstanding supply.
    pub total_supply: u64,
    /// Native coin set aside for this payout round.
    pub payout_pool: u64,
    /// Holder and balance, in the order they are paid.
    pub holders: Vec<(PublicKey, u64)>,
}

/// Source of token holder balances for dividend payouts.
pub trait TokenHolderSource: Send + Sync {
    /// Holdings of `token_id` at the current best block.
    fn holdings(&self, token_id: &Hash) -> Result<TokenHoldings, SubBuildError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Treasury that builds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTreasury;

impl TreasuryProcessors for NoTreasury {}

/// In-memory chain view.
#[derive(Default)]
pub struct MockChainReader {
    headers: RwLock<HashMap<ShardId, ShardHeader>>,
    transactions: RwLock<HashMap<Hash, Transaction>>,
    params: RwLock<StabilityParams>,
    db: Arc<InMemoryStore>,
}

impl MockChainReader {
    /// Empty chain view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the best header of its shard.
    pub fn set_best_header(&self, header: ShardHeader) {
        self.headers.write().insert(header.shard_id, header);
    }

    /// Make a transaction resolvable by hash.
    pub fn insert_transaction(&self, tx: Transaction) {
        self.transactions.write().insert(tx.hash(), tx);
    }

    /// Replace the stability parameters of every shard.
    pub fn set_params(&self, params: StabilityParams) {
        *self.params.write() = params;
    }
}

impl TemplateChainReader for MockChainReader {
    fn best_shard_header(&self, shard_id: ShardId) -> Option<ShardHeader> {
        self.headers.read().get(&shard_id).cloned()
    }

    fn transaction_by_hash(&self, hash: &Hash) -> Option<Transaction> {
        self.transactions.read().get(hash).cloned()
    }

    fn stability_params(&self, _shard_id: ShardId) -> StabilityParams {
        *self.params.read()
    }

    fn database(&self) -> Arc<dyn KeyValueStore> {
        self.db.clone()
    }
}

/// Verifier accepting everything except explicitly rejected hashes.
#[derive(Default)]
pub struct MockTxVerifier {
    rejected: RwLock<HashSet<Hash>>,
}

impl MockTxVerifier {
    /// Accept-all verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail validation of this transaction.
    pub fn reject(&self, hash: Hash) {
        self.rejected.write().insert(hash);
    }
}

impl TxVerifier for MockTxVerifier {
    fn validate_by_itself(
        &self,
        tx: &Transaction,
        _is_private: bool,
        _db: &dyn KeyValueStore,
        _chain: &dyn TemplateChainReader,
        _shard_id: ShardId,
    ) -> bool {
        !self.rejected.read().contains(&tx.hash())
    }
}

/// Metadata validator accepting everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllMetadata;

impl MetadataValidator for AcceptAllMetadata {
    fn validate_before_new_block(
        &self,
        _tx: &Transaction,
        _chain: &dyn TemplateChainReader,
        _shard_id: ShardId,
    ) -> bool {
        true
    }
}

/// Fixed holder table.
#[derive(Default)]
pub struct MockTokenHolders {
    tokens: RwLock<HashMap<Hash, TokenHoldings>>,
    fail: RwLock<bool>,
}

impl MockTokenHolders {
    /// Empty holder table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the holdings of a token.
    pub fn set(&self, token_id: Hash, holdings: TokenHoldings) {
        self.tokens.write().insert(token_id, holdings);
    }

    /// Make every lookup fail.
    pub fn fail_lookups(&self) {
        *self.fail.write() = true;
    }
}

impl TokenHolderSource for MockTokenHolders {
    fn holdings(&self, token_id: &Hash) -> Result<TokenHoldings, SubBuildError> {
        if *self.fail.read() {
            return Err(SubBuildError::HolderLookup("mock failure".into()));
        }
        Ok(self.tokens.read().get(token_id).cloned().unwrap_or_default())
    }
}
