//! Driving ports (Inbound API)

use crate::domain::{AssignedRole, BftMessage, ConsensusResult};
use async_trait::async_trait;

/// Consensus engine API - inbound port.
#[async_trait]
pub trait ConsensusEngineApi: Send + Sync {
    /// Spawn the worker. Fails with `AlreadyStarted` when running.
    fn start(&self) -> ConsensusResult<()>;

    /// Signal the worker and wait for it to exit. Fails with
    /// `AlreadyStopped` when not running.
    async fn stop(&self) -> ConsensusResult<()>;

    /// Queue a consensus message from a peer.
    fn deliver(&self, msg: BftMessage) -> ConsensusResult<()>;

    /// Role resolved on the last loop pass.
    fn current_role(&self) -> AssignedRole;

    /// Whether the worker is running.
    fn is_running(&self) -> bool;
}
