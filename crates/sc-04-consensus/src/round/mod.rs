//! # BFT Round
//!
//! One propose/vote/aggregate round for a single (chain, height).
//!
//! ```text
//! proposer:  Idle → Proposing → CollectingVotes → Finalizing → Idle
//! validator: Idle → AwaitProposal → Validating → Voting → Idle
//!                                       └── reject → AwaitProposal
//! ```
//!
//! A round ends finalized, abandoned at its deadline, or cancelled by
//! shutdown. It is never retried.

mod proposer;
mod validator;

use crate::config::ConsensusConfig;
use crate::domain::{
    BftMessage, BftRoundState, CommitteeSet, ConsensusResult, ProposerPhase, Role, RoundPhase,
    ValidatorPhase,
};
use crate::mailbox::{Mailbox, Received};
use crate::ports::{ConsensusPorts, SignatureScheme};
use sc_01_block_model::{Block, FinalityProof};
use shared_types::{hash_to_hex, Chain, PublicKey};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Inputs of one round, snapshotted by the engine when it starts.
#[derive(Debug, Clone)]
pub struct RoundContext {
    /// Chain being extended.
    pub chain: Chain,
    /// Height being decided.
    pub height: u64,
    /// Committee snapshot.
    pub committee: CommitteeSet,
    /// Role of this node.
    pub role: Role,
    /// Best block at round start; its proof becomes the candidate's parent proof.
    pub parent: Block,
}

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Block finalized with a quorum proof.
    Finalized(Box<Block>),
    /// Deadline passed without a decision.
    Abandoned,
    /// Shutdown was signalled.
    Cancelled,
}

enum Step {
    Message(BftMessage),
    End(RoundOutcome),
}

/// A single BFT round.
pub struct BftRound<'a> {
    id: Uuid,
    ctx: RoundContext,
    state: BftRoundState,
    quorum: usize,
    deadline: Instant,
    ports: &'a ConsensusPorts,
    config: &'a ConsensusConfig,
    mailbox: &'a mut Mailbox,
    shutdown: &'a mut watch::Receiver<bool>,
}

impl<'a> BftRound<'a> {
    /// Prepare a round. The deadline starts counting now.
    pub fn new(
        ctx: RoundContext,
        ports: &'a ConsensusPorts,
        config: &'a ConsensusConfig,
        mailbox: &'a mut Mailbox,
        shutdown: &'a mut watch::Receiver<bool>,
    ) -> Self {
        let state = BftRoundState::new(
            ctx.chain,
            ctx.height,
            ctx.committee.clone(),
            ctx.role.is_proposer(),
        );
        Self {
            id: Uuid::new_v4(),
            quorum: config.quorum.threshold(ctx.committee.len()),
            deadline: Instant::now() + config.timings.round_timeout,
            ctx,
            state,
            ports,
            config,
            mailbox,
            shutdown,
        }
    }

    /// Round correlation id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run the round to its end.
    #[tracing::instrument(skip(self), fields(round = %self.id, chain = %self.ctx.chain, height = self.ctx.height))]
    pub async fn run(mut self) -> ConsensusResult<RoundOutcome> {
        info!(
            role = %self.ctx.role,
            committee = self.ctx.committee.len(),
            quorum = self.quorum,
            "[sc-04] Starting round"
        );
        let outcome = if self.ctx.role.is_proposer() {
            self.run_proposer().await
        } else {
            self.run_validator().await
        };
        let idle = if self.state.is_proposer() {
            RoundPhase::Proposer(ProposerPhase::Idle)
        } else {
            RoundPhase::Validator(ValidatorPhase::Idle)
        };
        self.state.advance(idle);
        outcome
    }

    async fn next_message(&mut self) -> Step {
        let chain = self.ctx.chain;
        let height = self.ctx.height;
        let wait = self.mailbox.next_for(chain, height, &mut *self.shutdown);
        match tokio::time::timeout_at(self.deadline, wait).await {
            Ok(Received::Message(msg)) => Step::Message(msg),
            Ok(Received::Shutdown) | Ok(Received::Closed) => {
                info!("[sc-04] Round cancelled");
                Step::End(RoundOutcome::Cancelled)
            }
            Err(_) => {
                warn!(
                    votes = self.state.vote_count(),
                    quorum = self.quorum,
                    "[sc-04] Round timed out, abandoning height"
                );
                Step::End(RoundOutcome::Abandoned)
            }
        }
    }

    async fn broadcast(&self, msg: BftMessage) {
        let kind = msg.kind();
        if let Err(e) = self.ports.network.broadcast(msg).await {
            warn!(kind, error = %e, "[sc-04] Broadcast failed");
        }
    }

    async fn finalize(&mut self, block: Block) -> ConsensusResult<RoundOutcome> {
        self.state.aggregated = Some(block.proof().clone());
        if let Err(e) = self.ports.sink.on_finalized(block.clone()).await {
            error!(error = %e, "[sc-04] Finalized block sink failed");
        }
        let txs = match &block {
            Block::Shard(b) => b.body.transactions.len(),
            Block::Beacon(_) => 0,
        };
        info!(
            hash = %hash_to_hex(&block.hash()),
            signers = block.proof().validators_idx.len(),
            txs,
            "[sc-04] Block finalized"
        );
        Ok(RoundOutcome::Finalized(Box::new(block)))
    }

    fn my_key(&self) -> PublicKey {
        self.ports.signer.public_key()
    }
}

/// Check a finality proof against a committee.
///
/// The signer indices must be strictly ascending, in range and at least
/// `quorum` long, and the aggregate must verify over the block commitment.
pub fn verify_finality(
    committee: &CommitteeSet,
    quorum: usize,
    signer: &dyn SignatureScheme,
    block: &Block,
    proof: &FinalityProof,
) -> bool {
    let idx = &proof.validators_idx;
    if idx.len() < quorum.max(1) {
        return false;
    }
    if idx.windows(2).any(|w| w[0] >= w[1]) {
        return false;
    }
    let mut keys = Vec::with_capacity(idx.len());
    for i in idx {
        match committee.get(*i) {
            Some(key) => keys.push(key.clone()),
            None => return false,
        }
    }
    signer.verify_aggregate(&keys, &block.commitment(), &proof.aggregated_sig)
}
