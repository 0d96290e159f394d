//! In-process devnet.
//!
//! Every committee member gets its own [`ConsensusEngine`]. They share one
//! [`InMemoryChain`], which serves as chain view and as finalized-block
//! sink, and reach each other over a [`LoopbackNetwork`].
//!
//! ```text
//! node 0..k      → beacon committee
//! node k..2k     → shard 0 committee
//! node 2k..3k    → shard 1 committee
//! ...
//! ```

use crate::config::{ConfigError, NodeConfig};
use rand::Rng;
use sc_01_block_model::{OutputCoin, Transaction, Tx};
use sc_02_cross_shard::{CommitmentLedger, CrossShardRelay};
use sc_03_block_template::{
    BlockTemplateGenerator, MempoolMetadataValidator, NoTreasury, StructuralTxVerifier,
    TemplateConfig,
};
use sc_04_consensus::{
    ConsensusEngine, ConsensusEngineApi, ConsensusPorts, ConsensusResult, ConsensusStatus,
    Ed25519Scheme, InMemoryChain, LoopbackNetwork, NetworkStatus, SignatureScheme,
    SystemTimeSource,
};
use shared_types::{Chain, PublicKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Status reporter writing each published state to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatus;

impl NetworkStatus for TracingStatus {
    fn publish_consensus_state(&self, status: &ConsensusStatus) {
        debug!(
            node = %status.public_key_b58,
            mode = %status.node_mode,
            role = %status.role,
            beacon_committee = status.beacon_committee.len(),
            shard_committee = status.shard_committee.len(),
            "[node] Consensus state"
        );
    }
}

/// A running set of engines over one shared chain.
pub struct Devnet {
    config: NodeConfig,
    chain: Arc<InMemoryChain>,
    network: Arc<LoopbackNetwork>,
    engines: Vec<Arc<ConsensusEngine>>,
    feeder: parking_lot::Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl Devnet {
    /// Build the chain, the committees and one engine per member.
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let shard_count = config.consensus.shard_count;

        let ledger = Arc::new(CommitmentLedger::new());
        let chain = Arc::new(InMemoryChain::new(shard_count, ledger.clone()));
        let relay = Arc::new(CrossShardRelay::new(shard_count, ledger));
        let templates = Arc::new(BlockTemplateGenerator::new(
            TemplateConfig {
                max_txs_in_block: config.max_txs_in_block,
                shard_count,
                ..TemplateConfig::default()
            },
            chain.clone(),
            Arc::new(StructuralTxVerifier),
            Arc::new(MempoolMetadataValidator),
            Arc::new(NoTreasury),
            relay.clone(),
        ));
        let network = LoopbackNetwork::new();

        let signers: Vec<Arc<Ed25519Scheme>> = (0..config.node_count())
            .map(|i| {
                // validate() keeps seed_base + node_count within u8
                let seed = config.devnet.seed_base.wrapping_add(i as u8);
                Arc::new(Ed25519Scheme::from_seed([seed; 32]))
            })
            .collect();

        for (idx, members) in signers.chunks(config.devnet.committee_size).enumerate() {
            let chain_id = committee_chain(idx);
            let keys: Vec<PublicKey> = members.iter().map(|s| s.public_key()).collect();
            info!(chain = %chain_id, members = keys.len(), "[node] Committee assigned");
            chain.set_committee(chain_id, keys);
        }

        let engines = signers
            .into_iter()
            .map(|signer| {
                let key = signer.public_key();
                let ports = ConsensusPorts {
                    chain: chain.clone(),
                    templates: templates.clone(),
                    verifier: Arc::new(StructuralTxVerifier),
                    relay: relay.clone(),
                    network: Arc::new(network.endpoint(key.clone())),
                    sink: chain.clone(),
                    status: Arc::new(TracingStatus),
                    signer,
                    time: Arc::new(SystemTimeSource),
                };
                let engine = Arc::new(ConsensusEngine::new(config.consensus.clone(), ports));
                network.register(key, &engine);
                engine
            })
            .collect();

        Ok(Self {
            config,
            chain,
            network,
            engines,
            feeder: parking_lot::Mutex::new(None),
        })
    }

    /// Shared chain state.
    pub fn chain(&self) -> Arc<InMemoryChain> {
        self.chain.clone()
    }

    /// Engines, ordered as the committees are laid out.
    pub fn engines(&self) -> &[Arc<ConsensusEngine>] {
        &self.engines
    }

    /// Peers reachable over the loopback network.
    pub fn peer_count(&self) -> usize {
        self.network.peer_count()
    }

    /// Best height of the beacon chain and of every shard.
    pub fn heights(&self) -> Vec<(Chain, u64)> {
        std::iter::once(Chain::Beacon)
            .chain((0..self.config.consensus.shard_count).map(Chain::Shard))
            .map(|c| (c, self.chain.height(c)))
            .collect()
    }

    /// Start every engine, then the transaction feeder if configured.
    pub fn start(&self) -> ConsensusResult<()> {
        for engine in &self.engines {
            engine.start()?;
        }
        if let Some(interval) = self.config.devnet.tx_interval {
            let (tx, rx) = watch::channel(false);
            let handle = tokio::spawn(feed_transactions(self.chain.clone(), interval, rx));
            *self.feeder.lock() = Some((tx, handle));
        }
        info!(nodes = self.engines.len(), "[node] Devnet started");
        Ok(())
    }

    /// Stop the feeder and every engine.
    pub async fn stop(&self) {
        let feeder = self.feeder.lock().take();
        if let Some((tx, handle)) = feeder {
            let _ = tx.send(true);
            if let Err(e) = handle.await {
                warn!(error = %e, "[node] Transaction feeder failed");
            }
        }
        for engine in &self.engines {
            if let Err(e) = engine.stop().await {
                debug!(node = %engine.public_key(), "[node] {}", e);
            }
        }
        info!("[node] Devnet stopped");
    }

    /// Log the height of every chain.
    pub fn report(&self) {
        for (chain, height) in self.heights() {
            info!(chain = %chain, height, "[node] Chain height");
        }
        info!(mempool = self.chain.mempool_len(), "[node] Mempool size");
    }
}

fn committee_chain(idx: usize) -> Chain {
    match idx {
        0 => Chain::Beacon,
        n => Chain::Shard((n - 1) as u8),
    }
}

/// Random transfer with one output. The receiver is drawn independently
/// of the sender, so most transfers cross shards.
pub fn synthetic_transaction<R: Rng>(rng: &mut R) -> Transaction {
    let sender = PublicKey::from_bytes(vec![rng.gen(), rng.gen()]);
    let receiver = PublicKey::from_bytes(vec![rng.gen(), rng.gen()]);
    let value = rng.gen_range(1..=1_000);
    let fee = rng.gen_range(1..=10);
    Transaction::Normal(
        Tx::new(sender, fee, 0).with_outputs(vec![OutputCoin::new(receiver, value)]),
    )
}

async fn feed_transactions(
    chain: Arc<InMemoryChain>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let tx = synthetic_transaction(&mut rand::thread_rng());
                chain.submit_transaction(tx);
            }
        }
    }
    debug!("[node] Transaction feeder stopped");
}
