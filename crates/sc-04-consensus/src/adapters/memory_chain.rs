//! In-memory chain state.
//!
//! Holds genesis and the best block of every chain, the committees, a
//! mempool and a transaction index. Applying a finalized block is
//! idempotent, so several engines may share one instance.

use crate::ports::{ChainState, FinalizedBlockSink};
use async_trait::async_trait;
use parking_lot::RwLock;
use sc_01_block_model::{
    BeaconBlock, BeaconBody, BeaconHeader, Block, CrossOutputCoin, FinalityProof, ShardBlock,
    ShardBody, ShardHeader, Transaction,
};
use sc_02_cross_shard::CommitmentLedger;
use sc_03_block_template::{StabilityParams, TemplateChainReader};
use shared_types::{
    hash_to_hex, Chain, Hash, InMemoryStore, KeyValueStore, PublicKey, ShardId, ZERO_HASH,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Chain state kept in memory.
pub struct InMemoryChain {
    shard_count: u8,
    ready: AtomicBool,
    committees: RwLock<HashMap<Chain, Vec<PublicKey>>>,
    best: RwLock<HashMap<Chain, Block>>,
    transactions: RwLock<HashMap<Hash, Transaction>>,
    mempool: RwLock<Vec<Transaction>>,
    params: RwLock<HashMap<ShardId, StabilityParams>>,
    ledger: Arc<CommitmentLedger>,
    db: Arc<InMemoryStore>,
}

impl InMemoryChain {
    /// Chain with a genesis block for the beacon and every shard.
    pub fn new(shard_count: u8, ledger: Arc<CommitmentLedger>) -> Self {
        let mut best = HashMap::new();
        best.insert(Chain::Beacon, genesis_beacon());
        for shard_id in 0..shard_count {
            best.insert(Chain::Shard(shard_id), genesis_shard(shard_id));
        }
        Self {
            shard_count,
            ready: AtomicBool::new(true),
            committees: RwLock::new(HashMap::new()),
            best: RwLock::new(best),
            transactions: RwLock::new(HashMap::new()),
            mempool: RwLock::new(Vec::new()),
            params: RwLock::new(HashMap::new()),
            ledger,
            db: Arc::new(InMemoryStore::new()),
        }
    }

    /// Replace the committee of a chain.
    pub fn set_committee(&self, chain: Chain, members: Vec<PublicKey>) {
        self.committees.write().insert(chain, members);
    }

    /// Mark the chain synced or syncing.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Set the stability parameters of a shard.
    pub fn set_stability_params(&self, shard_id: ShardId, params: StabilityParams) {
        self.params.write().insert(shard_id, params);
    }

    /// Add a transaction to the mempool.
    pub fn submit_transaction(&self, tx: Transaction) {
        self.mempool.write().push(tx);
    }

    /// Mempool size.
    pub fn mempool_len(&self) -> usize {
        self.mempool.read().len()
    }

    /// Height of the best block of `chain`.
    pub fn height(&self, chain: Chain) -> u64 {
        self.best.read().get(&chain).map(Block::height).unwrap_or(0)
    }

    /// Commitment ledger fed by applied shard blocks.
    pub fn ledger(&self) -> Arc<CommitmentLedger> {
        self.ledger.clone()
    }

    /// Make `block` the best block of its chain.
    ///
    /// Returns false, changing nothing, when the chain is already at or
    /// past the block's height.
    pub fn apply(&self, block: Block) -> bool {
        let chain = block.chain();
        {
            let best = self.best.read();
            if best.get(&chain).is_some_and(|b| b.height() >= block.height()) {
                return false;
            }
        }

        if let Block::Shard(shard) = &block {
            self.apply_shard_effects(shard);
        }

        let mut best = self.best.write();
        if best.get(&chain).is_some_and(|b| b.height() >= block.height()) {
            return false;
        }
        debug!(
            chain = %chain,
            height = block.height(),
            hash = %hash_to_hex(&block.hash()),
            "[sc-04] Applied block"
        );
        best.insert(chain, block);
        true
    }

    fn apply_shard_effects(&self, shard: &ShardBlock) {
        let shard_id = shard.header.shard_id;
        let included: HashSet<Hash> = shard.body.transactions.iter().map(|tx| tx.hash()).collect();
        {
            let mut index = self.transactions.write();
            for tx in &shard.body.transactions {
                index.insert(tx.hash(), tx.clone());
            }
        }
        self.mempool
            .write()
            .retain(|tx| !included.contains(&tx.hash()));
        self.params
            .write()
            .entry(shard_id)
            .or_default()
            .salary_fund = shard.header.salary_fund;

        self.ledger.record_block(shard, self.shard_count);
        self.ledger
            .mark_consumed(shard_id, &shard.body.cross_output_coins);
    }
}

fn genesis_beacon() -> Block {
    Block::Beacon(BeaconBlock {
        header: BeaconHeader::new(PublicKey::default(), 0, ZERO_HASH),
        body: BeaconBody::default(),
        producer_sig: Vec::new(),
        proof: FinalityProof::default(),
        parent_proof: FinalityProof::default(),
    })
}

fn genesis_shard(shard_id: ShardId) -> Block {
    Block::Shard(ShardBlock {
        header: ShardHeader::new(shard_id, PublicKey::default(), 0, ZERO_HASH),
        body: ShardBody::default(),
        producer_sig: Vec::new(),
        proof: FinalityProof::default(),
        parent_proof: FinalityProof::default(),
    })
}

impl TemplateChainReader for InMemoryChain {
    fn best_shard_header(&self, shard_id: ShardId) -> Option<ShardHeader> {
        match self.best.read().get(&Chain::Shard(shard_id)) {
            Some(Block::Shard(block)) => Some(block.header.clone()),
            _ => None,
        }
    }

    fn transaction_by_hash(&self, hash: &Hash) -> Option<Transaction> {
        self.transactions.read().get(hash).cloned()
    }

    fn stability_params(&self, shard_id: ShardId) -> StabilityParams {
        self.params
            .read()
            .get(&shard_id)
            .copied()
            .unwrap_or_default()
    }

    fn database(&self) -> Arc<dyn KeyValueStore> {
        self.db.clone()
    }
}

impl ChainState for InMemoryChain {
    fn as_template_reader(&self) -> &dyn TemplateChainReader {
        self
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn current_committee(&self, chain: Chain) -> Vec<PublicKey> {
        self.committees
            .read()
            .get(&chain)
            .cloned()
            .unwrap_or_default()
    }

    fn best_block(&self, chain: Chain) -> Option<Block> {
        self.best.read().get(&chain).cloned()
    }

    fn pending_transactions(&self, shard_id: ShardId) -> Vec<Transaction> {
        self.mempool
            .read()
            .iter()
            .filter(|tx| tx.shard_id(self.shard_count) == shard_id)
            .cloned()
            .collect()
    }

    fn pending_cross_shard_bundles(&self, shard_id: ShardId) -> Vec<CrossOutputCoin> {
        self.ledger.pending_for(shard_id)
    }

    fn evict_transactions(&self, hashes: &[Hash]) -> usize {
        let doomed: HashSet<Hash> = hashes.iter().copied().collect();
        let mut mempool = self.mempool.write();
        let before = mempool.len();
        mempool.retain(|tx| !doomed.contains(&tx.hash()));
        before - mempool.len()
    }
}

#[async_trait]
impl FinalizedBlockSink for InMemoryChain {
    async fn on_finalized(&self, block: Block) -> Result<(), String> {
        if !self.apply(block) {
            debug!("[sc-04] Finalized block already applied");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_01_block_model::{OutputCoin, Tx};

    fn chain() -> InMemoryChain {
        InMemoryChain::new(4, Arc::new(CommitmentLedger::new()))
    }

    fn shard_block(shard_id: ShardId, height: u64, txs: Vec<Transaction>) -> Block {
        let mut header = ShardHeader::new(shard_id, PublicKey::from_bytes(vec![1]), height, [1u8; 32]);
        header.salary_fund = 77;
        Block::Shard(ShardBlock {
            header,
            body: ShardBody {
                transactions: txs,
                ..ShardBody::default()
            },
            producer_sig: Vec::new(),
            proof: FinalityProof::default(),
            parent_proof: FinalityProof::default(),
        })
    }

    #[test]
    fn test_genesis_for_every_chain() {
        let chain = chain();
        assert_eq!(chain.best_block(Chain::Beacon).map(|b| b.height()), Some(0));
        for shard in 0..4 {
            assert!(chain.best_shard_header(shard).is_some());
        }
        assert!(chain.best_shard_header(4).is_none());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let chain = chain();
        assert!(chain.apply(shard_block(1, 1, vec![])));
        assert!(!chain.apply(shard_block(1, 1, vec![])));
        assert_eq!(chain.height(Chain::Shard(1)), 1);
    }

    #[test]
    fn test_apply_drains_mempool_and_indexes() {
        let chain = chain();
        let tx = Transaction::Normal(Tx::new(PublicKey::from_bytes(vec![9, 2]), 1, 0));
        chain.submit_transaction(tx.clone());
        assert_eq!(chain.pending_transactions(2).len(), 1);
        assert!(chain.pending_transactions(1).is_empty());

        chain.apply(shard_block(2, 1, vec![tx.clone()]));
        assert_eq!(chain.mempool_len(), 0);
        assert_eq!(chain.transaction_by_hash(&tx.hash()), Some(tx));
        assert_eq!(chain.stability_params(2).salary_fund, 77);
    }

    #[test]
    fn test_evict_drops_only_named() {
        let chain = chain();
        let keep = Transaction::Normal(Tx::new(PublicKey::from_bytes(vec![9, 1]), 1, 0));
        let drop = Transaction::Normal(Tx::new(PublicKey::from_bytes(vec![9, 1]), 2, 0));
        chain.submit_transaction(keep.clone());
        chain.submit_transaction(drop.clone());

        assert_eq!(chain.evict_transactions(&[drop.hash(), [7u8; 32]]), 1);
        assert_eq!(chain.pending_transactions(1), vec![keep]);
        assert_eq!(chain.evict_transactions(&[drop.hash()]), 0);
    }

    #[test]
    fn test_outbound_bundles_queued_for_destination() {
        let chain = chain();
        let receiver = PublicKey::from_bytes(vec![5, 3]);
        let tx = Transaction::Normal(
            Tx::new(PublicKey::from_bytes(vec![9, 0]), 1, 0)
                .with_outputs(vec![OutputCoin::new(receiver, 40)]),
        );
        chain.apply(shard_block(0, 1, vec![tx]));
        assert_eq!(chain.pending_cross_shard_bundles(3).len(), 1);
    }

    #[test]
    fn test_committees() {
        let chain = chain();
        assert!(chain.current_committee(Chain::Beacon).is_empty());
        chain.set_committee(Chain::Beacon, vec![PublicKey::from_bytes(vec![1])]);
        assert_eq!(chain.current_committee(Chain::Beacon).len(), 1);
    }
}
