//! Ports layer for the consensus engine

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;

use sc_02_cross_shard::CrossShardRelayApi;
use sc_03_block_template::{BlockTemplateApi, TxVerifier};
use std::sync::Arc;

/// Every collaborator the engine and its rounds call into.
#[derive(Clone)]
pub struct ConsensusPorts {
    /// Chain state view.
    pub chain: Arc<dyn ChainState>,
    /// Block template generator, used when proposing shard blocks.
    pub templates: Arc<dyn BlockTemplateApi>,
    /// Transaction self-validation, used when validating proposals.
    pub verifier: Arc<dyn TxVerifier>,
    /// Cross-shard bundle verification.
    pub relay: Arc<dyn CrossShardRelayApi>,
    /// Consensus gossip.
    pub network: Arc<dyn ConsensusNetwork>,
    /// Destination of finalized blocks.
    pub sink: Arc<dyn FinalizedBlockSink>,
    /// Network-status reporter.
    pub status: Arc<dyn NetworkStatus>,
    /// Node signing key.
    pub signer: Arc<dyn SignatureScheme>,
    /// Clock for block timestamps.
    pub time: Arc<dyn TimeSource>,
}
