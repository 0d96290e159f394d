//! Proposer side of a round.

use super::{BftRound, RoundOutcome, Step};
use crate::domain::{BftMessage, ConsensusResult, ProposerPhase, RoundPhase};
use sc_01_block_model::{
    BeaconBlock, BeaconBody, BeaconHeader, Block, FinalityProof, ShardState,
};
use sc_03_block_template::BlockDraft;
use shared_types::{Chain, Hash, PublicKey, ZERO_HASH};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

impl BftRound<'_> {
    pub(super) async fn run_proposer(&mut self) -> ConsensusResult<RoundOutcome> {
        self.state
            .advance(RoundPhase::Proposer(ProposerPhase::Proposing));

        let mut block = self.build_candidate()?;
        if block.height() != self.ctx.height || block.prev_block_hash() != self.ctx.parent.hash() {
            warn!(
                built_height = block.height(),
                "[sc-04] Chain moved while building the candidate, abandoning height"
            );
            return Ok(RoundOutcome::Abandoned);
        }

        let me = self.my_key();
        let Some(my_idx) = self.ctx.committee.index_of(&me) else {
            warn!("[sc-04] Proposer is not in the committee snapshot");
            return Ok(RoundOutcome::Abandoned);
        };

        let signer = self.ports.signer.clone();
        block.set_producer_sig(signer.sign(&block.hash()));
        let block_hash = block.hash();
        let commitment = block.commitment();

        self.state.candidate = Some(block.clone());
        self.state
            .advance(RoundPhase::Proposer(ProposerPhase::CollectingVotes));
        self.broadcast(BftMessage::Propose {
            chain: self.ctx.chain,
            height: self.ctx.height,
            block: Box::new(block.clone()),
            proposer: me,
        })
        .await;
        self.state.record_vote(my_idx, signer.sign(&commitment));
        info!(
            hash = %shared_types::hash_to_hex(&block_hash),
            "[sc-04] Candidate proposed"
        );

        while self.state.vote_count() < self.quorum {
            let msg = match self.next_message().await {
                Step::Message(msg) => msg,
                Step::End(outcome) => return Ok(outcome),
            };
            match msg {
                BftMessage::Vote {
                    block_hash: voted,
                    voter_idx,
                    voter,
                    sig,
                    ..
                } => {
                    self.accept_vote(&block_hash, &commitment, voted, voter_idx, &voter, sig);
                }
                other => debug!(
                    kind = other.kind(),
                    sender = %other.sender(),
                    "[sc-04] Ignoring message while collecting votes"
                ),
            }
        }

        self.state
            .advance(RoundPhase::Proposer(ProposerPhase::Finalizing));
        let (validators_idx, sigs) = self.state.ordered_votes();
        let proof = FinalityProof {
            aggregated_sig: signer.aggregate(&sigs),
            validators_idx,
        };
        block.set_proof(proof.clone());

        self.broadcast(BftMessage::Commit {
            chain: self.ctx.chain,
            height: self.ctx.height,
            block_hash,
            proof,
            sender: self.my_key(),
        })
        .await;
        self.finalize(block).await
    }

    fn accept_vote(
        &mut self,
        block_hash: &Hash,
        commitment: &Hash,
        voted: Hash,
        voter_idx: usize,
        voter: &PublicKey,
        sig: Vec<u8>,
    ) -> bool {
        if voted != *block_hash {
            debug!(voter = %voter, "[sc-04] Vote for another block");
            return false;
        }
        if self.ctx.committee.get(voter_idx) != Some(voter) {
            warn!(voter = %voter, voter_idx, "[sc-04] Vote index does not match the committee");
            return false;
        }
        if !self.ports.signer.verify(voter, commitment, &sig) {
            warn!(voter = %voter, "[sc-04] Vote signature invalid");
            return false;
        }
        if !self.state.record_vote(voter_idx, sig) {
            debug!(voter = %voter, "[sc-04] Duplicate vote");
            return false;
        }
        debug!(
            voter = %voter,
            votes = self.state.vote_count(),
            quorum = self.quorum,
            "[sc-04] Vote accepted"
        );
        true
    }

    fn build_candidate(&self) -> ConsensusResult<Block> {
        let ports = self.ports;
        let producer = self.my_key();
        let parent_proof = self.ctx.parent.proof().clone();
        let epoch = self.ctx.height / self.config.epoch_length.max(1);
        let timestamp = i64::try_from(ports.time.now()).unwrap_or(i64::MAX);

        match self.ctx.chain {
            Chain::Shard(shard_id) => {
                let pending = ports.chain.pending_transactions(shard_id);
                let template = ports.templates.build_template(&pending, shard_id, &producer)?;
                if !template.groups.txs_to_evict.is_empty() {
                    let hashes: Vec<Hash> =
                        template.groups.txs_to_evict.iter().map(|tx| tx.hash()).collect();
                    let evicted = ports.chain.evict_transactions(&hashes);
                    debug!(shard_id, evicted, "[sc-04] Evicted invalid mempool transactions");
                }
                let (beacon_height, beacon_hash) = ports
                    .chain
                    .best_block(Chain::Beacon)
                    .map(|b| (b.height(), b.hash()))
                    .unwrap_or((0, ZERO_HASH));
                let draft = BlockDraft {
                    producer,
                    timestamp,
                    epoch,
                    committee: self.ctx.committee.members().to_vec(),
                    beacon_height,
                    beacon_hash,
                    instructions: Vec::new(),
                    inbound: ports.chain.pending_cross_shard_bundles(shard_id),
                };
                let mut block = ports.templates.assemble_block(template, draft);
                block.parent_proof = parent_proof;
                Ok(Block::Shard(block))
            }
            Chain::Beacon => {
                let mut shard_states = BTreeMap::new();
                for shard_id in 0..self.config.shard_count {
                    if let Some(Block::Shard(best)) = ports.chain.best_block(Chain::Shard(shard_id)) {
                        shard_states.insert(
                            shard_id,
                            ShardState {
                                height: best.header.height,
                                hash: best.hash(),
                                cross_shards: best.header.cross_shards.clone(),
                            },
                        );
                    }
                }
                let body = BeaconBody {
                    shard_states,
                    instructions: Vec::new(),
                };
                let mut header =
                    BeaconHeader::new(producer, self.ctx.height, self.ctx.parent.hash());
                header.epoch = epoch;
                header.timestamp = timestamp;
                body.seal(&mut header);
                Ok(Block::Beacon(BeaconBlock {
                    header,
                    body,
                    producer_sig: Vec::new(),
                    proof: FinalityProof::default(),
                    parent_proof,
                }))
            }
        }
    }
}
