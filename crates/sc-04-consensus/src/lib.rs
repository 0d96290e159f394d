//! # SC-04 Consensus Engine
//!
//! Role resolution, BFT rounds and the worker that drives them.
//!
//! **Subsystem ID:** 4  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every pass of the worker loop reads the committees from chain state,
//! resolves this node's role for the next height and, when it holds one,
//! runs a single BFT round:
//! - The proposer at `height mod len(committee)` builds, signs and
//!   broadcasts a candidate
//! - Validators recompute the roots, verify every cross-shard bundle and
//!   every transaction, then vote or stay silent
//! - A quorum of votes is aggregated into the block's finality proof
//!
//! A round that misses its deadline is abandoned, never retried.
//!
//! ## Lifecycle
//!
//! ```text
//!            start()                     stop()
//! Stopped ────────────► Running ──────────────────► Stopped
//!    ▲   AlreadyStopped    │  AlreadyStarted
//!    └── stop() ✗          └── start() ✗
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! sc-04-consensus/
//! ├── domain/          # Committee, roles, quorum, messages, round state
//! ├── ports/           # ConsensusEngineApi, chain/network/signing ports
//! ├── adapters/        # Ed25519 scheme, in-memory chain, loopback network
//! ├── round/           # BftRound: proposer and validator paths
//! ├── mailbox.rs       # Per-height message intake with future stash
//! ├── config.rs        # ConsensusConfig, Timings
//! └── service/         # ConsensusEngine and its worker loop
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod mailbox;
pub mod ports;
pub mod round;
pub mod service;

#[cfg(test)]
mod test_support;

// Re-exports
pub use adapters::{Ed25519Scheme, InMemoryChain, LoopbackEndpoint, LoopbackNetwork};
pub use config::{ConsensusConfig, Timings};
pub use domain::{
    resolve_role, AssignedRole, BftMessage, BftRoundState, CommitteeSet, ConsensusError,
    ConsensusResult, NodeMode, ProposalRejection, QuorumRule, Role,
};
pub use ports::{
    ChainState, ConsensusEngineApi, ConsensusNetwork, ConsensusPorts, ConsensusStatus,
    FinalizedBlockSink, NetworkStatus, SignatureScheme, SystemTimeSource, TimeSource,
};
pub use round::{verify_finality, BftRound, RoundContext, RoundOutcome};
pub use service::ConsensusEngine;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
