//! Fixtures shared by the round and engine tests.

use crate::adapters::{Ed25519Scheme, InMemoryChain};
use crate::domain::{BftMessage, CommitteeSet};
use crate::ports::{
    ConsensusNetwork, ConsensusPorts, FinalizedBlockSink, ManualTimeSource, NetworkStatus,
    SignatureScheme,
};
use sc_01_block_model::{Block, FinalityProof};
use sc_02_cross_shard::{CommitmentLedger, CrossShardRelay};
use sc_03_block_template::{
    BlockDraft, BlockTemplateApi, BlockTemplateGenerator, MempoolMetadataValidator, NoTreasury,
    StructuralTxVerifier, TemplateConfig,
};
use shared_types::{Chain, PublicKey, ShardId};
use std::sync::Arc;

pub(crate) const SHARDS: u8 = 4;

pub(crate) struct Fixture {
    pub chain: Arc<InMemoryChain>,
    pub relay: Arc<CrossShardRelay<CommitmentLedger>>,
    pub templates: Arc<BlockTemplateGenerator>,
}

pub(crate) fn signer(seed: u8) -> Arc<Ed25519Scheme> {
    Arc::new(Ed25519Scheme::from_seed([seed; 32]))
}

pub(crate) fn keys(signers: &[Arc<Ed25519Scheme>]) -> Vec<PublicKey> {
    signers.iter().map(|s| s.public_key()).collect()
}

pub(crate) fn fixture() -> Fixture {
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
    Fixture {
        chain,
        relay,
        templates,
    }
}

pub(crate) fn ports(
    fx: &Fixture,
    signer: Arc<Ed25519Scheme>,
    network: Arc<dyn ConsensusNetwork>,
    sink: Arc<dyn FinalizedBlockSink>,
    status: Arc<dyn NetworkStatus>,
) -> ConsensusPorts {
    ConsensusPorts {
        chain: fx.chain.clone(),
        templates: fx.templates.clone(),
        verifier: Arc::new(StructuralTxVerifier),
        relay: fx.relay.clone(),
        network,
        sink,
        status,
        signer,
        time: Arc::new(ManualTimeSource::new(1_700_000_000)),
    }
}

/// Producer-signed shard proposal on top of the fixture's best block.
pub(crate) fn shard_proposal(
    fx: &Fixture,
    proposer: &Ed25519Scheme,
    committee: &CommitteeSet,
    shard_id: ShardId,
) -> Block {
    use crate::ports::ChainState;

    let parent = fx
        .chain
        .best_block(Chain::Shard(shard_id))
        .expect("genesis exists");
    let pending = fx.chain.pending_transactions(shard_id);
    let template = fx
        .templates
        .build_template(&pending, shard_id, &proposer.public_key())
        .expect("template builds");
    let draft = BlockDraft {
        producer: proposer.public_key(),
        timestamp: 1_700_000_000,
        committee: committee.members().to_vec(),
        ..BlockDraft::default()
    };
    let mut shard = fx.templates.assemble_block(template, draft);
    shard.parent_proof = parent.proof().clone();
    let mut block = Block::Shard(shard);
    block.set_producer_sig(proposer.sign(&block.hash()));
    block
}

/// Vote of `voter` at committee position `idx`.
pub(crate) fn vote(voter: &Ed25519Scheme, idx: usize, block: &Block) -> BftMessage {
    BftMessage::Vote {
        chain: block.chain(),
        height: block.height(),
        block_hash: block.hash(),
        voter_idx: idx,
        voter: voter.public_key(),
        sig: voter.sign(&block.commitment()),
    }
}

/// Proof signed by `(idx, signer)` pairs given in ascending index order.
pub(crate) fn proof(block: &Block, signers: &[(usize, &Ed25519Scheme)]) -> FinalityProof {
    let sigs: Vec<Vec<u8>> = signers
        .iter()
        .map(|(_, s)| s.sign(&block.commitment()))
        .collect();
    FinalityProof {
        aggregated_sig: sigs.concat(),
        validators_idx: signers.iter().map(|(i, _)| *i).collect(),
    }
}
