//! # Consensus Network Flow
//!
//! A beacon committee and one committee per shard, each member driven by
//! its own engine, all sharing one chain and one loopback network. Time is
//! paused, so round timeouts elapse instantly once every task is idle.
//!
//! ## Flow Tested:
//!
//! 1. **Mempool → Shard round (4)**: a transfer is proposed, voted and finalized
//! 2. **Shard (1) → Relay (2) → Shard round (4)**: its output is consumed
//!    by the destination shard, verified by every validator
//! 3. **Abandoned rounds**: a silent proposer stalls its chain only

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sc_01_block_model::{Block, OutputCoin, Transaction, Tx};
    use sc_02_cross_shard::{CommitmentLedger, CrossShardRelay};
    use sc_03_block_template::{
        BlockTemplateGenerator, MempoolMetadataValidator, NoTreasury, StructuralTxVerifier,
        TemplateChainReader, TemplateConfig,
    };
    use sc_04_consensus::{
        verify_finality, CommitteeSet, ConsensusConfig, ConsensusEngine, ConsensusEngineApi,
        ConsensusPorts, ConsensusStatus, Ed25519Scheme, FinalizedBlockSink, InMemoryChain,
        LoopbackNetwork, NetworkStatus, QuorumRule, SignatureScheme, SystemTimeSource,
    };
    use shared_types::{Chain, PublicKey};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::time::Duration;

    const SHARDS: u8 = 2;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Sink that records every finalized block before applying it.
    struct TeeSink {
        chain: Arc<InMemoryChain>,
        blocks: Mutex<Vec<Block>>,
    }

    #[async_trait]
    impl FinalizedBlockSink for TeeSink {
        async fn on_finalized(&self, block: Block) -> Result<(), String> {
            self.blocks.lock().push(block.clone());
            self.chain.on_finalized(block).await
        }
    }

    struct Quiet;

    impl NetworkStatus for Quiet {
        fn publish_consensus_state(&self, _status: &ConsensusStatus) {}
    }

    struct Network {
        chain: Arc<InMemoryChain>,
        sink: Arc<TeeSink>,
        engines: Vec<Arc<ConsensusEngine>>,
        committees: HashMap<Chain, CommitteeSet>,
    }

    impl Network {
        /// Committees of `size` members for the beacon and each shard.
        /// Members listed in `silent` (global node index) are never started.
        fn start(size: usize, silent: &[usize]) -> Self {
            let ledger = Arc::new(CommitmentLedger::new());
            let chain = Arc::new(InMemoryChain::new(SHARDS, ledger.clone()));
            let relay = Arc::new(CrossShardRelay::new(SHARDS, ledger));
            let templates = Arc::new(BlockTemplateGenerator::new(
                TemplateConfig {
                    shard_count: SHARDS,
                    ..TemplateConfig::default()
                },
                chain.clone(),
                Arc::new(StructuralTxVerifier),
                Arc::new(MempoolMetadataValidator),
                Arc::new(NoTreasury),
                relay.clone(),
            ));
            let sink = Arc::new(TeeSink {
                chain: chain.clone(),
                blocks: Mutex::new(Vec::new()),
            });
            let hub = LoopbackNetwork::new();

            let node_count = size * (usize::from(SHARDS) + 1);
            let signers: Vec<Arc<Ed25519Scheme>> = (1..=node_count as u8)
                .map(|seed| Arc::new(Ed25519Scheme::from_seed([seed; 32])))
                .collect();

            let mut committees = HashMap::new();
            for (idx, members) in signers.chunks(size).enumerate() {
                let target = match idx {
                    0 => Chain::Beacon,
                    n => Chain::Shard((n - 1) as u8),
                };
                let keys: Vec<PublicKey> = members.iter().map(|s| s.public_key()).collect();
                chain.set_committee(target, keys.clone());
                committees.insert(target, CommitteeSet::new(keys).expect("valid committee"));
            }

            let config = ConsensusConfig {
                shard_count: SHARDS,
                ..ConsensusConfig::for_testing()
            };
            let mut engines = Vec::new();
            for (idx, signer) in signers.into_iter().enumerate() {
                let key = signer.public_key();
                let ports = ConsensusPorts {
                    chain: chain.clone(),
                    templates: templates.clone(),
                    verifier: Arc::new(StructuralTxVerifier),
                    relay: relay.clone(),
                    network: Arc::new(hub.endpoint(key.clone())),
                    sink: sink.clone(),
                    status: Arc::new(Quiet),
                    signer,
                    time: Arc::new(SystemTimeSource),
                };
                let engine = Arc::new(ConsensusEngine::new(config.clone(), ports));
                hub.register(key, &engine);
                if !silent.contains(&idx) {
                    engine.start().expect("engine starts");
                }
                engines.push(engine);
            }

            Self {
                chain,
                sink,
                engines,
                committees,
            }
        }

        async fn stop(&self) {
            for engine in &self.engines {
                if engine.is_running() {
                    engine.stop().await.expect("engine stops");
                }
            }
        }

        /// One copy of every finalized block of `chain`, by height.
        fn finalized(&self, chain: Chain) -> BTreeMap<u64, Block> {
            self.sink
                .blocks
                .lock()
                .iter()
                .filter(|b| b.chain() == chain)
                .map(|b| (b.height(), b.clone()))
                .collect()
        }
    }

    fn transfer(sender_last: u8, receiver_last: u8, value: u64) -> Transaction {
        let sender = PublicKey::from_bytes(vec![0x10, sender_last]);
        let receiver = PublicKey::from_bytes(vec![0x20, receiver_last]);
        Transaction::Normal(
            Tx::new(sender, 2, 0).with_outputs(vec![OutputCoin::new(receiver, value)]),
        )
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_cross_shard_transfer_finalized() {
        let net = Network::start(3, &[]);
        let tx = transfer(0, 1, 500);
        net.chain.submit_transaction(tx.clone());

        tokio::time::sleep(Duration::from_secs(5)).await;
        net.stop().await;

        assert!(net.chain.transaction_by_hash(&tx.hash()).is_some());
        assert_eq!(net.chain.mempool_len(), 0);

        let source = net
            .finalized(Chain::Shard(0))
            .into_values()
            .find(|b| matches!(b, Block::Shard(s) if s.body.transactions.contains(&tx)))
            .expect("transfer finalized on shard 0");

        let consumed = net
            .finalized(Chain::Shard(1))
            .into_values()
            .filter_map(|b| match b {
                Block::Shard(s) => Some(s),
                Block::Beacon(_) => None,
            })
            .flat_map(|s| s.body.cross_output_coins)
            .find(|bundle| bundle.block_hash == source.hash())
            .expect("bundle consumed on shard 1");
        assert_eq!(consumed.output_coins[0].value, 500);
        assert!(net.chain.ledger().pending_for(1).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_finalized_block_carries_quorum() {
        let net = Network::start(3, &[]);
        tokio::time::sleep(Duration::from_secs(3)).await;
        net.stop().await;

        let verifier = Ed25519Scheme::from_seed([0xAB; 32]);
        let chains = [Chain::Beacon, Chain::Shard(0), Chain::Shard(1)];
        for chain in chains {
            let committee = &net.committees[&chain];
            let quorum = QuorumRule::Byzantine.threshold(committee.len());
            let blocks = net.finalized(chain);
            assert!(blocks.len() >= 2, "{chain} finalized {} blocks", blocks.len());

            for block in blocks.values() {
                assert!(
                    verify_finality(committee, quorum, &verifier, block, block.proof()),
                    "{chain} block {} lacks a valid proof",
                    block.height()
                );
                assert_eq!(block.producer(), committee.proposer_at(block.height()));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_carry_parent_proof() {
        let net = Network::start(3, &[]);
        tokio::time::sleep(Duration::from_secs(3)).await;
        net.stop().await;

        let blocks: Vec<Block> = net.finalized(Chain::Shard(1)).into_values().collect();
        assert!(blocks.len() >= 2);
        for pair in blocks.windows(2) {
            if pair[1].height() != pair[0].height() + 1 {
                continue;
            }
            assert_eq!(pair[1].prev_block_hash(), pair[0].hash());
            assert_eq!(pair[1].parent_proof(), pair[0].proof());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_proposer_stalls_only_its_chain() {
        // Shard 0 members are nodes 4..8; node 6 sits at committee index 2,
        // the proposer of height 3.
        let net = Network::start(4, &[6]);
        tokio::time::sleep(Duration::from_secs(10)).await;
        net.stop().await;

        assert_eq!(net.chain.height(Chain::Shard(0)), 2);
        assert!(net.chain.height(Chain::Shard(1)) > 3);
        assert!(net.chain.height(Chain::Beacon) > 3);
    }
}
