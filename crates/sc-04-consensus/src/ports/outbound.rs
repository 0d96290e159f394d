//! Driven ports (Outbound dependencies)
//!
//! Chain state, the consensus network, the finalized-block sink, the
//! network-status reporter, the signature scheme and the clock.

use crate::domain::{BftMessage, NodeMode, Role};
use async_trait::async_trait;
use parking_lot::Mutex;
use sc_01_block_model::{Block, CrossOutputCoin, Transaction};
use sc_03_block_template::TemplateChainReader;
use serde::{Deserialize, Serialize};
use shared_types::{Chain, Hash, PublicKey, ShardId};
use std::sync::atomic::{AtomicU64, Ordering};

/// View of chain state.
///
/// Committees and best blocks are snapshots; the engine never mutates them.
/// Its only write is [`ChainState::evict_transactions`].
pub trait ChainState: TemplateChainReader {
    /// This view as the reader the template generator and verifiers take.
    fn as_template_reader(&self) -> &dyn TemplateChainReader;

    /// Whether the chain has finished syncing.
    fn is_ready(&self) -> bool;

    /// Committee of `chain` in committee order.
    fn current_committee(&self, chain: Chain) -> Vec<PublicKey>;

    /// Best block of `chain`, carrying its finality proof.
    fn best_block(&self, chain: Chain) -> Option<Block>;

    /// Mempool transactions in mempool order.
    fn pending_transactions(&self, shard_id: ShardId) -> Vec<Transaction>;

    /// Cross-shard bundles addressed to `shard_id` and not yet consumed.
    fn pending_cross_shard_bundles(&self, shard_id: ShardId) -> Vec<CrossOutputCoin>;

    /// Drop mempool transactions that can never be admitted. Returns the
    /// number removed; unknown hashes are ignored.
    fn evict_transactions(&self, hashes: &[Hash]) -> usize;
}

/// Gossip of consensus messages to the other committee members.
#[async_trait]
pub trait ConsensusNetwork: Send + Sync {
    /// Send `msg` to every peer.
    async fn broadcast(&self, msg: BftMessage) -> Result<(), String>;
}

/// Receiver of blocks finalized by this node.
#[async_trait]
pub trait FinalizedBlockSink: Send + Sync {
    /// Persist a block that carries a quorum proof.
    async fn on_finalized(&self, block: Block) -> Result<(), String>;
}

/// Consensus state published once per loop pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusStatus {
    /// Configured node mode.
    pub node_mode: NodeMode,
    /// Node key in base58.
    pub public_key_b58: String,
    /// Resolved role.
    pub role: Role,
    /// Beacon committee in base58.
    pub beacon_committee: Vec<String>,
    /// Committee of the node's shard in base58; empty when it has none.
    pub shard_committee: Vec<String>,
}

/// Network-status collaborator. Fire-and-forget.
pub trait NetworkStatus: Send + Sync {
    /// Publish the current consensus state.
    fn publish_consensus_state(&self, status: &ConsensusStatus);
}

/// Signing and verification of votes and proposals.
pub trait SignatureScheme: Send + Sync {
    /// Key of this node.
    fn public_key(&self) -> PublicKey;

    /// Sign `message` with this node's key.
    fn sign(&self, message: &[u8]) -> Vec<u8>;

    /// Verify one signature.
    fn verify(&self, key: &PublicKey, message: &[u8], sig: &[u8]) -> bool;

    /// Combine signatures already ordered by committee index.
    fn aggregate(&self, sigs: &[Vec<u8>]) -> Vec<u8>;

    /// Verify an aggregate against the signer keys in the same order.
    fn verify_aggregate(&self, keys: &[PublicKey], message: &[u8], aggregated: &[u8]) -> bool;
}

/// Time source abstraction for testability.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// System clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Network that records every broadcast.
#[derive(Default)]
pub struct RecordingNetwork {
    sent: Mutex<Vec<BftMessage>>,
}

impl RecordingNetwork {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages broadcast so far.
    pub fn sent(&self) -> Vec<BftMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ConsensusNetwork for RecordingNetwork {
    async fn broadcast(&self, msg: BftMessage) -> Result<(), String> {
        self.sent.lock().push(msg);
        Ok(())
    }
}

/// Sink that records finalized blocks.
#[derive(Default)]
pub struct RecordingSink {
    blocks: Mutex<Vec<Block>>,
}

impl RecordingSink {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks finalized so far.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.lock().clone()
    }
}

#[async_trait]
impl FinalizedBlockSink for RecordingSink {
    async fn on_finalized(&self, block: Block) -> Result<(), String> {
        self.blocks.lock().push(block);
        Ok(())
    }
}

/// Status reporter that records every publication.
#[derive(Default)]
pub struct RecordingStatus {
    published: Mutex<Vec<ConsensusStatus>>,
}

impl RecordingStatus {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses published so far.
    pub fn published(&self) -> Vec<ConsensusStatus> {
        self.published.lock().clone()
    }
}

impl NetworkStatus for RecordingStatus {
    fn publish_consensus_state(&self, status: &ConsensusStatus) {
        self.published.lock().push(status.clone());
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: AtomicU64,
}

impl ManualTimeSource {
    /// Clock reading `now`.
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
