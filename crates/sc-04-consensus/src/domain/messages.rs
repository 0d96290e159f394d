//! Consensus wire messages.

use sc_01_block_model::{Block, FinalityProof};
use serde::{Deserialize, Serialize};
use shared_types::{Chain, Hash, PublicKey};

/// Message exchanged by committee members during a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BftMessage {
    /// Candidate block from the height's proposer.
    Propose {
        /// Chain of the round.
        chain: Chain,
        /// Height of the round.
        height: u64,
        /// Candidate block, producer-signed.
        block: Box<Block>,
        /// Proposer key.
        proposer: PublicKey,
    },
    /// A validator's signature over the candidate's commitment.
    Vote {
        /// Chain of the round.
        chain: Chain,
        /// Height of the round.
        height: u64,
        /// Hash of the block voted for.
        block_hash: Hash,
        /// Voter position in the committee.
        voter_idx: usize,
        /// Voter key.
        voter: PublicKey,
        /// Signature over the block commitment.
        sig: Vec<u8>,
    },
    /// Quorum proof for a finalized block.
    Commit {
        /// Chain of the round.
        chain: Chain,
        /// Height of the round.
        height: u64,
        /// Hash of the finalized block.
        block_hash: Hash,
        /// Aggregated committee signature.
        proof: FinalityProof,
        /// Aggregator key.
        sender: PublicKey,
    },
}

impl BftMessage {
    /// Chain the message belongs to.
    pub fn chain(&self) -> Chain {
        match self {
            BftMessage::Propose { chain, .. }
            | BftMessage::Vote { chain, .. }
            | BftMessage::Commit { chain, .. } => *chain,
        }
    }

    /// Height the message belongs to.
    pub fn height(&self) -> u64 {
        match self {
            BftMessage::Propose { height, .. }
            | BftMessage::Vote { height, .. }
            | BftMessage::Commit { height, .. } => *height,
        }
    }

    /// Key of the member that sent the message.
    pub fn sender(&self) -> &PublicKey {
        match self {
            BftMessage::Propose { proposer, .. } => proposer,
            BftMessage::Vote { voter, .. } => voter,
            BftMessage::Commit { sender, .. } => sender,
        }
    }

    /// Short message name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BftMessage::Propose { .. } => "propose",
            BftMessage::Vote { .. } => "vote",
            BftMessage::Commit { .. } => "commit",
        }
    }
}
