//! Validator side of a round.

use super::{verify_finality, BftRound, RoundOutcome, Step};
use crate::domain::{
    BftMessage, ConsensusResult, ProposalRejection, RoundPhase, ValidatorPhase,
};
use sc_01_block_model::Block;
use shared_types::{hash_to_hex, PublicKey};
use tracing::{debug, info, warn};

impl BftRound<'_> {
    pub(super) async fn run_validator(&mut self) -> ConsensusResult<RoundOutcome> {
        self.state
            .advance(RoundPhase::Validator(ValidatorPhase::AwaitProposal));

        loop {
            let msg = match self.next_message().await {
                Step::Message(msg) => msg,
                Step::End(outcome) => return Ok(outcome),
            };
            match msg {
                BftMessage::Propose {
                    block, proposer, ..
                } => {
                    if self.state.candidate.is_some() {
                        debug!(proposer = %proposer, "[sc-04] Already voted this height, ignoring proposal");
                        continue;
                    }
                    self.state
                        .advance(RoundPhase::Validator(ValidatorPhase::Validating));
                    match self.validate_proposal(&block, &proposer) {
                        Ok(()) => self.vote(*block).await,
                        Err(reason) => {
                            warn!(
                                proposer = %proposer,
                                reason = %reason,
                                "[sc-04] Withholding vote"
                            );
                            self.state
                                .advance(RoundPhase::Validator(ValidatorPhase::AwaitProposal));
                        }
                    }
                }
                BftMessage::Commit {
                    block_hash,
                    proof,
                    sender,
                    ..
                } => {
                    let Some(candidate) = self.state.candidate.as_ref() else {
                        debug!(sender = %sender, "[sc-04] Commit for a block this node did not vote for");
                        continue;
                    };
                    if candidate.hash() != block_hash {
                        warn!(
                            sender = %sender,
                            hash = %hash_to_hex(&block_hash),
                            "[sc-04] Commit names a different block"
                        );
                        continue;
                    }
                    if !verify_finality(
                        &self.ctx.committee,
                        self.quorum,
                        self.ports.signer.as_ref(),
                        candidate,
                        &proof,
                    ) {
                        warn!(sender = %sender, "[sc-04] Commit carries an invalid proof");
                        continue;
                    }
                    let mut block = candidate.clone();
                    block.set_proof(proof);
                    return self.finalize(block).await;
                }
                BftMessage::Vote { voter, .. } => {
                    debug!(voter = %voter, "[sc-04] Validator ignoring vote");
                }
            }
        }
    }

    async fn vote(&mut self, block: Block) {
        let me = self.my_key();
        let Some(voter_idx) = self.ctx.committee.index_of(&me) else {
            warn!("[sc-04] Validator is not in the committee snapshot");
            return;
        };
        let msg = BftMessage::Vote {
            chain: self.ctx.chain,
            height: self.ctx.height,
            block_hash: block.hash(),
            voter_idx,
            voter: me,
            sig: self.ports.signer.sign(&block.commitment()),
        };
        info!(hash = %hash_to_hex(&block.hash()), "[sc-04] Voting for proposal");
        self.state.candidate = Some(block);
        self.state
            .advance(RoundPhase::Validator(ValidatorPhase::Voting));
        self.broadcast(msg).await;
    }

    /// Every check a validator runs before voting.
    pub(super) fn validate_proposal(
        &self,
        block: &Block,
        proposer: &PublicKey,
    ) -> Result<(), ProposalRejection> {
        let ctx = &self.ctx;
        if block.chain() != ctx.chain {
            return Err(ProposalRejection::WrongChain {
                expected: ctx.chain,
                actual: block.chain(),
            });
        }
        if block.height() != ctx.height {
            return Err(ProposalRejection::WrongHeight {
                expected: ctx.height,
                actual: block.height(),
            });
        }
        let expected = ctx.committee.proposer_at(ctx.height);
        if block.producer() != expected || proposer != expected {
            return Err(ProposalRejection::WrongProposer {
                expected: expected.to_base58(),
                actual: block.producer().to_base58(),
            });
        }
        if !self
            .ports
            .signer
            .verify(expected, &block.hash(), block.producer_sig())
        {
            return Err(ProposalRejection::BadProducerSig);
        }
        if block.prev_block_hash() != ctx.parent.hash() {
            return Err(ProposalRejection::WrongParent);
        }
        if block.parent_proof() != ctx.parent.proof() {
            return Err(ProposalRejection::BadParentProof);
        }

        match block {
            Block::Beacon(beacon) => beacon.verify_roots()?,
            Block::Shard(shard) => {
                let ports = self.ports;
                shard.verify_roots(self.config.shard_count)?;
                ports.relay.verify_outbound(shard)?;
                for bundle in &shard.body.cross_output_coins {
                    ports.relay.verify_inbound(bundle)?;
                }
                let db = ports.chain.database();
                let reader = ports.chain.as_template_reader();
                for tx in &shard.body.transactions {
                    if !ports.verifier.validate_by_itself(
                        tx,
                        tx.is_privacy(),
                        db.as_ref(),
                        reader,
                        shard.header.shard_id,
                    ) {
                        return Err(ProposalRejection::InvalidTx(hash_to_hex(&tx.hash())));
                    }
                }
            }
        }
        Ok(())
    }
}
