//! Per-height round state.

use super::committee::CommitteeSet;
use sc_01_block_model::{Block, FinalityProof};
use shared_types::Chain;
use std::collections::BTreeMap;

/// Proposer state machine: `Idle → Proposing → CollectingVotes → Finalizing → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposerPhase {
    /// Round created, nothing built yet.
    Idle,
    /// Building and signing the candidate.
    Proposing,
    /// Candidate broadcast, waiting for votes.
    CollectingVotes,
    /// Quorum reached, proof aggregated.
    Finalizing,
}

/// Validator state machine: `Idle → AwaitProposal → Validating → Voting → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorPhase {
    /// Round created.
    Idle,
    /// Waiting for the proposer's candidate.
    AwaitProposal,
    /// Checking a received candidate.
    Validating,
    /// Vote sent, waiting for the commit.
    Voting,
}

/// Phase of a round, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Proposer side.
    Proposer(ProposerPhase),
    /// Validator side.
    Validator(ValidatorPhase),
}

impl RoundPhase {
    /// Whether `next` is a legal successor. Any phase may drop back to
    /// `Idle` when the round ends.
    pub fn can_advance_to(&self, next: RoundPhase) -> bool {
        use ProposerPhase as P;
        use ValidatorPhase as V;
        match (*self, next) {
            (RoundPhase::Proposer(_), RoundPhase::Proposer(P::Idle)) => true,
            (RoundPhase::Validator(_), RoundPhase::Validator(V::Idle)) => true,
            (RoundPhase::Proposer(from), RoundPhase::Proposer(to)) => matches!(
                (from, to),
                (P::Idle, P::Proposing)
                    | (P::Proposing, P::CollectingVotes)
                    | (P::CollectingVotes, P::Finalizing)
            ),
            (RoundPhase::Validator(from), RoundPhase::Validator(to)) => matches!(
                (from, to),
                (V::Idle, V::AwaitProposal)
                    | (V::AwaitProposal, V::Validating)
                    | (V::Validating, V::Voting)
                    | (V::Validating, V::AwaitProposal)
            ),
            _ => false,
        }
    }
}

/// Ephemeral state of one round. Owned by the round; dropped when it ends.
#[derive(Debug, Clone)]
pub struct BftRoundState {
    /// Chain of the round.
    pub chain: Chain,
    /// Height being decided.
    pub height: u64,
    /// Committee snapshot taken when the round started.
    pub committee: CommitteeSet,
    /// Candidate block once built or received.
    pub candidate: Option<Block>,
    /// Aggregated proof once quorum is reached.
    pub aggregated: Option<FinalityProof>,
    votes: BTreeMap<usize, Vec<u8>>,
    phase: RoundPhase,
}

impl BftRoundState {
    /// Fresh state in the `Idle` phase of the given side.
    pub fn new(chain: Chain, height: u64, committee: CommitteeSet, is_proposer: bool) -> Self {
        let phase = if is_proposer {
            RoundPhase::Proposer(ProposerPhase::Idle)
        } else {
            RoundPhase::Validator(ValidatorPhase::Idle)
        };
        Self {
            chain,
            height,
            committee,
            candidate: None,
            aggregated: None,
            votes: BTreeMap::new(),
            phase,
        }
    }

    /// Whether this node proposes.
    pub fn is_proposer(&self) -> bool {
        matches!(self.phase, RoundPhase::Proposer(_))
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Move to `next`. Returns false and stays put on an illegal move.
    pub fn advance(&mut self, next: RoundPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            return false;
        }
        self.phase = next;
        true
    }

    /// Record a vote. Returns false when the member already voted.
    pub fn record_vote(&mut self, voter_idx: usize, sig: Vec<u8>) -> bool {
        if self.votes.contains_key(&voter_idx) {
            return false;
        }
        self.votes.insert(voter_idx, sig);
        true
    }

    /// Number of distinct voters.
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Voter indices and signatures in ascending index order.
    pub fn ordered_votes(&self) -> (Vec<usize>, Vec<Vec<u8>>) {
        self.votes
            .iter()
            .map(|(idx, sig)| (*idx, sig.clone()))
            .unzip()
    }
}
