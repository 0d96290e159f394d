//! # Cross-Shard Flow
//!
//! Block production without consensus: the template generator builds and
//! seals shard blocks, the in-memory chain applies them and the commitment
//! ledger carries outputs to their destination shard.
//!
//! ## Flow Tested:
//!
//! 1. **Template (3) → Block (1)**: mempool selection, roots sealed
//! 2. **Block (1) → Relay (2)**: outbound commitments recorded on apply
//! 3. **Relay (2) → Template (3)**: destination shard consumes the bundle

#[cfg(test)]
mod tests {
    use sc_01_block_model::{Block, CrossOutputCoin, OutputCoin, ShardBlock, Transaction, Tx};
    use sc_02_cross_shard::{CommitmentLedger, CrossShardRelay, CrossShardRelayApi};
    use sc_03_block_template::{
        BlockDraft, BlockTemplateApi, BlockTemplateGenerator, MempoolMetadataValidator,
        NoTreasury, StructuralTxVerifier, TemplateChainReader, TemplateConfig,
    };
    use sc_04_consensus::{ChainState, InMemoryChain};
    use shared_types::{Chain, PublicKey, ShardId};
    use std::sync::Arc;

    const SHARDS: u8 = 2;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Node {
        chain: Arc<InMemoryChain>,
        relay: Arc<CrossShardRelay<CommitmentLedger>>,
        templates: BlockTemplateGenerator,
    }

    fn node(max_txs_in_block: usize) -> Node {
        let ledger = Arc::new(CommitmentLedger::new());
        let chain = Arc::new(InMemoryChain::new(SHARDS, ledger.clone()));
        let relay = Arc::new(CrossShardRelay::new(SHARDS, ledger));
        let templates = BlockTemplateGenerator::new(
            TemplateConfig {
                max_txs_in_block,
                shard_count: SHARDS,
                ..TemplateConfig::default()
            },
            chain.clone(),
            Arc::new(StructuralTxVerifier),
            Arc::new(MempoolMetadataValidator),
            Arc::new(NoTreasury),
            relay.clone(),
        );
        Node {
            chain,
            relay,
            templates,
        }
    }

    /// Transfer from a sender routed by `sender_last` to a receiver routed
    /// by `receiver_last`.
    fn transfer(sender_last: u8, receiver_last: u8, value: u64) -> Transaction {
        let sender = PublicKey::from_bytes(vec![0x10, sender_last]);
        let receiver = PublicKey::from_bytes(vec![0x20, receiver_last]);
        Transaction::Normal(
            Tx::new(sender, 2, 0).with_outputs(vec![OutputCoin::new(receiver, value)]),
        )
    }

    fn produce_with(node: &Node, shard_id: ShardId, inbound: Vec<CrossOutputCoin>) -> ShardBlock {
        let producer = PublicKey::from_bytes(vec![0xEE, shard_id]);
        let pending = node.chain.pending_transactions(shard_id);
        let template = node
            .templates
            .build_template(&pending, shard_id, &producer)
            .expect("template builds");
        let draft = BlockDraft {
            producer,
            timestamp: 1_700_000_000 + i64::from(shard_id),
            inbound,
            ..BlockDraft::default()
        };
        node.templates.assemble_block(template, draft)
    }

    fn produce(node: &Node, shard_id: ShardId) -> ShardBlock {
        let inbound = node.chain.pending_cross_shard_bundles(shard_id);
        produce_with(node, shard_id, inbound)
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[test]
    fn test_output_reaches_destination_shard() {
        let node = node(100);
        let tx = transfer(0, 1, 500);
        node.chain.submit_transaction(tx.clone());

        let source = produce(&node, 0);
        assert_eq!(source.body.transactions, vec![tx.clone()]);
        source.verify_roots(SHARDS).unwrap();
        node.relay.verify_outbound(&source).unwrap();
        assert!(node.chain.apply(Block::Shard(source.clone())));
        assert!(node.chain.transaction_by_hash(&tx.hash()).is_some());

        let inbound = node.chain.pending_cross_shard_bundles(1);
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].shard_id, 1);
        assert_eq!(inbound[0].block_hash, source.hash());
        assert_eq!(inbound[0].output_coins.len(), 1);
        assert_eq!(inbound[0].output_coins[0].value, 500);
        node.relay.verify_inbound(&inbound[0]).unwrap();

        let destination = produce(&node, 1);
        assert_eq!(destination.body.cross_output_coins, inbound);
        destination.verify_roots(SHARDS).unwrap();
        assert!(node.chain.apply(Block::Shard(destination)));
        assert!(node.chain.pending_cross_shard_bundles(1).is_empty());
    }

    #[test]
    fn test_local_output_creates_no_bundle() {
        let node = node(100);
        node.chain.submit_transaction(transfer(0, 2, 40));

        let block = produce(&node, 0);
        assert_eq!(block.body.transactions.len(), 1);
        assert!(node.chain.apply(Block::Shard(block)));

        assert!(node.chain.pending_cross_shard_bundles(0).is_empty());
        assert!(node.chain.pending_cross_shard_bundles(1).is_empty());
    }

    #[test]
    fn test_forged_bundle_dropped_at_assembly() {
        let node = node(100);
        node.chain.submit_transaction(transfer(0, 1, 500));
        let source = produce(&node, 0);
        assert!(node.chain.apply(Block::Shard(source)));

        let mut forged = node.chain.pending_cross_shard_bundles(1).remove(0);
        forged.output_coins[0].value = 5_000;
        assert!(node.relay.verify_inbound(&forged).is_err());

        let destination = produce_with(&node, 1, vec![forged]);
        assert!(destination.body.cross_output_coins.is_empty());
        destination.verify_roots(SHARDS).unwrap();
    }

    #[test]
    fn test_bundle_for_other_shard_ignored() {
        let node = node(100);
        node.chain.submit_transaction(transfer(0, 1, 500));
        let source = produce(&node, 0);
        assert!(node.chain.apply(Block::Shard(source)));

        let for_shard_1 = node.chain.pending_cross_shard_bundles(1);
        let block = produce_with(&node, 0, for_shard_1);
        assert!(block.body.cross_output_coins.is_empty());
    }

    #[test]
    fn test_block_ceiling_leaves_rest_in_mempool() {
        let node = node(2);
        for receiver in [2, 4, 6] {
            node.chain.submit_transaction(transfer(0, receiver, 10));
        }

        let block = produce(&node, 0);
        assert_eq!(block.body.transactions.len(), 2);
        assert!(node.chain.apply(Block::Shard(block)));
        assert_eq!(node.chain.mempool_len(), 1);

        let next = produce(&node, 0);
        assert_eq!(next.body.transactions.len(), 1);
    }

    #[test]
    fn test_blocks_link_to_parent() {
        let node = node(100);
        let first = produce(&node, 1);
        assert_eq!(first.header.height, 1);
        assert!(node.chain.apply(Block::Shard(first.clone())));

        let second = produce(&node, 1);
        assert_eq!(second.header.height, 2);
        assert_eq!(second.header.prev_block_hash, first.hash());

        assert!(!node.chain.apply(Block::Shard(first)));
        assert_eq!(node.chain.height(Chain::Shard(1)), 1);
    }
}
