//! Error types for the consensus engine

use sc_01_block_model::BlockError;
use sc_02_cross_shard::RelayError;
use sc_03_block_template::TemplateError;
use shared_types::Chain;

/// Consensus engine error types
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// `start` called on a running engine.
    #[error("Consensus engine is already started")]
    AlreadyStarted,

    /// `stop` called on a stopped engine.
    #[error("Consensus engine is already stopped")]
    AlreadyStopped,

    /// A message was delivered while the engine was stopped.
    #[error("Consensus engine is not running")]
    NotRunning,

    /// The worker mailbox has no free slot.
    #[error("Consensus mailbox is full")]
    MailboxFull,

    /// The worker task panicked or was aborted.
    #[error("Consensus worker failed: {0}")]
    WorkerFailed(String),

    /// A committee snapshot had no members.
    #[error("Committee is empty")]
    EmptyCommittee,

    /// A committee snapshot listed the same key twice.
    #[error("Duplicate committee member: {0}")]
    DuplicateMember(String),

    /// The chain has no block to build on.
    #[error("No best block for {0}")]
    NoBestBlock(Chain),

    /// Building the proposer's block failed.
    #[error("Template build failed: {0}")]
    Template(#[from] TemplateError),

    /// The consensus network refused a message.
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Reason a validator withholds its vote from a proposal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProposalRejection {
    /// Proposal is for another chain.
    #[error("Wrong chain: expected {expected}, got {actual}")]
    WrongChain {
        /// Chain of the round.
        expected: Chain,
        /// Chain named by the block.
        actual: Chain,
    },

    /// Proposal is for another height.
    #[error("Wrong height: expected {expected}, got {actual}")]
    WrongHeight {
        /// Height of the round.
        expected: u64,
        /// Height of the block.
        actual: u64,
    },

    /// Block was produced by someone other than the height's proposer.
    #[error("Wrong proposer: expected {expected}, got {actual}")]
    WrongProposer {
        /// Base58 key of the expected proposer.
        expected: String,
        /// Base58 key named by the block.
        actual: String,
    },

    /// Producer signature does not verify.
    #[error("Invalid producer signature")]
    BadProducerSig,

    /// Block does not extend the local best block.
    #[error("Block does not extend the best block")]
    WrongParent,

    /// Parent proof differs from the previous block's finality proof.
    #[error("Parent proof does not match the previous block")]
    BadParentProof,

    /// Header roots do not match the body.
    #[error("Malformed block: {0}")]
    Malformed(#[from] BlockError),

    /// A cross-shard bundle failed verification.
    #[error("Cross-shard bundle rejected: {0}")]
    Bundle(#[from] RelayError),

    /// A transaction failed self-validation.
    #[error("Transaction {0} failed self-validation")]
    InvalidTx(String),
}
