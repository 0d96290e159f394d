//! # Consensus Engine
//!
//! Process-lifetime owner of the consensus worker.
//!
//! ## Worker loop
//!
//! ```text
//! ┌────────────► shutdown? ──yes──► exit
//! │                 │ no
//! │            chain ready? ──no──► sleep(readiness_poll) ─┐
//! │                 │ yes                                   │
//! │          sleep(settle_delay)                            │
//! │     read committees, publish status, resolve role       │
//! │                 │                                       │
//! │            role held? ──no──► sleep(idle_after_no_role) ┤
//! │                 │ yes                                   │
//! │            run BftRound(chain, best + 1)                │
//! └─────────────────┴───────────────────────────────────────┘
//! ```

use crate::config::ConsensusConfig;
use crate::domain::{
    resolve_role, AssignedRole, BftMessage, CommitteeSet, ConsensusError, ConsensusResult,
    NodeMode, Role,
};
use crate::mailbox::Mailbox;
use crate::ports::{ConsensusEngineApi, ConsensusPorts, ConsensusStatus};
use crate::round::{BftRound, RoundContext, RoundOutcome};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{Chain, PublicKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

enum Lifecycle {
    Stopped,
    Running {
        shutdown_tx: watch::Sender<bool>,
        mailbox_tx: mpsc::Sender<BftMessage>,
        handle: JoinHandle<()>,
    },
}

/// The consensus engine.
///
/// `start` spawns one worker task; `stop` signals it and waits for it to
/// exit. Both transitions happen under the lifecycle lock.
pub struct ConsensusEngine {
    config: ConsensusConfig,
    ports: ConsensusPorts,
    lifecycle: Mutex<Lifecycle>,
    role: Arc<RwLock<AssignedRole>>,
}

impl ConsensusEngine {
    /// Create a stopped engine.
    pub fn new(config: ConsensusConfig, ports: ConsensusPorts) -> Self {
        info!(
            mode = %config.node_mode,
            shards = config.shard_count,
            key = %ports.signer.public_key(),
            "[sc-04] Initializing consensus engine"
        );
        Self {
            config,
            ports,
            lifecycle: Mutex::new(Lifecycle::Stopped),
            role: Arc::new(RwLock::new(AssignedRole::none())),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Node key.
    pub fn public_key(&self) -> PublicKey {
        self.ports.signer.public_key()
    }
}

#[async_trait]
impl ConsensusEngineApi for ConsensusEngine {
    fn start(&self) -> ConsensusResult<()> {
        let mut lifecycle = self.lifecycle.lock();
        if matches!(*lifecycle, Lifecycle::Running { .. }) {
            return Err(ConsensusError::AlreadyStarted);
        }

        let (mailbox_tx, mailbox_rx) = mpsc::channel(self.config.mailbox_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Worker {
            config: self.config.clone(),
            ports: self.ports.clone(),
            role: self.role.clone(),
            mailbox: Mailbox::new(mailbox_rx, self.config.stash_capacity),
            shutdown: shutdown_rx,
            abandoned: None,
        };
        let handle = tokio::spawn(worker.run());

        *lifecycle = Lifecycle::Running {
            shutdown_tx,
            mailbox_tx,
            handle,
        };
        info!("[sc-04] Consensus engine started");
        Ok(())
    }

    async fn stop(&self) -> ConsensusResult<()> {
        let handle = {
            let mut lifecycle = self.lifecycle.lock();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Stopped => return Err(ConsensusError::AlreadyStopped),
                Lifecycle::Running {
                    shutdown_tx,
                    handle,
                    ..
                } => {
                    // The worker may already have exited; nothing to signal then.
                    let _ = shutdown_tx.send(true);
                    handle
                }
            }
        };

        handle
            .await
            .map_err(|e| ConsensusError::WorkerFailed(e.to_string()))?;
        *self.role.write() = AssignedRole::none();
        info!("[sc-04] Consensus engine stopped");
        Ok(())
    }

    fn deliver(&self, msg: BftMessage) -> ConsensusResult<()> {
        match &*self.lifecycle.lock() {
            Lifecycle::Stopped => Err(ConsensusError::NotRunning),
            Lifecycle::Running { mailbox_tx, .. } => {
                mailbox_tx.try_send(msg).map_err(|e| match e {
                    TrySendError::Full(_) => ConsensusError::MailboxFull,
                    TrySendError::Closed(_) => ConsensusError::NotRunning,
                })
            }
        }
    }

    fn current_role(&self) -> AssignedRole {
        *self.role.read()
    }

    fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Running { .. })
    }
}

/// Result of one committee read.
struct Assignment {
    assigned: AssignedRole,
    status: ConsensusStatus,
    round: Option<RoundContext>,
}

struct Worker {
    config: ConsensusConfig,
    ports: ConsensusPorts,
    role: Arc<RwLock<AssignedRole>>,
    mailbox: Mailbox,
    shutdown: watch::Receiver<bool>,
    abandoned: Option<(Chain, u64)>,
}

impl Worker {
    async fn run(mut self) {
        info!("[sc-04] Consensus worker running");
        let timings = self.config.timings.clone();

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            if !self.ports.chain.is_ready() {
                debug!("[sc-04] Chain not ready");
                if self.sleep(timings.readiness_poll).await {
                    break;
                }
                continue;
            }

            if self.sleep(timings.settle_delay).await {
                break;
            }

            let assignment = self.resolve_assignment();
            self.ports
                .status
                .publish_consensus_state(&assignment.status);
            *self.role.write() = assignment.assigned;

            let Some(ctx) = assignment.round else {
                let dropped = self.mailbox.discard_queued();
                debug!(dropped, "[sc-04] No role, idling");
                if self.sleep(timings.idle_after_no_role).await {
                    break;
                }
                continue;
            };

            let key = (ctx.chain, ctx.height);
            if self.abandoned == Some(key) {
                debug!(
                    chain = %ctx.chain,
                    height = ctx.height,
                    "[sc-04] Height already abandoned, waiting for the chain to advance"
                );
                if self.sleep(timings.idle_after_no_role).await {
                    break;
                }
                continue;
            }

            let round = BftRound::new(
                ctx,
                &self.ports,
                &self.config,
                &mut self.mailbox,
                &mut self.shutdown,
            );
            match round.run().await {
                Ok(RoundOutcome::Finalized(_)) => self.abandoned = None,
                Ok(RoundOutcome::Abandoned) => self.abandoned = Some(key),
                Ok(RoundOutcome::Cancelled) => break,
                Err(e) => {
                    error!(chain = %key.0, height = key.1, error = %e, "[sc-04] Round failed");
                    self.abandoned = Some(key);
                }
            }
        }

        info!("[sc-04] Consensus worker exited");
    }

    /// Sleep for `duration`. Returns true when shutdown was signalled.
    async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            changed = self.shutdown.changed() => {
                if changed.is_err() {
                    return true;
                }
            }
            _ = tokio::time::sleep(duration) => {}
        }
        *self.shutdown.borrow()
    }

    /// Read committees and pick the chain this node works on this pass.
    ///
    /// Beacon and shard participation are exclusive: in `Auto` mode beacon
    /// membership wins.
    fn resolve_assignment(&self) -> Assignment {
        let chain_state = &self.ports.chain;
        let me = self.ports.signer.public_key();

        let beacon = self.committee(Chain::Beacon);
        let shard = if self.config.node_mode == NodeMode::Beacon {
            None
        } else {
            (0..self.config.shard_count)
                .map(Chain::Shard)
                .find_map(|chain| {
                    self.committee(chain)
                        .filter(|c| c.contains(&me))
                        .map(|c| (chain, c))
                })
        };

        let beacon_names = beacon.as_ref().map(CommitteeSet::to_base58).unwrap_or_default();
        let shard_names = shard
            .as_ref()
            .map(|(_, c)| c.to_base58())
            .unwrap_or_default();

        let beacon_member = beacon
            .filter(|c| c.contains(&me))
            .map(|c| (Chain::Beacon, c));
        let selected = match self.config.node_mode {
            NodeMode::Beacon => beacon_member,
            NodeMode::Shard => shard,
            NodeMode::Auto => beacon_member.or(shard),
        };

        let round = selected.and_then(|(chain, committee)| {
            let Some(parent) = chain_state.best_block(chain) else {
                warn!(chain = %chain, "[sc-04] {}", ConsensusError::NoBestBlock(chain));
                return None;
            };
            let height = parent.height() + 1;
            let role = resolve_role(&committee, &me, height, chain.kind());
            Some(RoundContext {
                chain,
                height,
                committee,
                role,
                parent,
            })
        });

        let assigned = match &round {
            Some(ctx) => AssignedRole {
                role: ctx.role,
                chain: Some(ctx.chain),
            },
            None => AssignedRole::none(),
        };
        debug!(role = %assigned.role, chain = ?assigned.chain, "[sc-04] Role resolved");

        Assignment {
            assigned,
            status: ConsensusStatus {
                node_mode: self.config.node_mode,
                public_key_b58: me.to_base58(),
                role: assigned.role,
                beacon_committee: beacon_names,
                shard_committee: shard_names,
            },
            round: round.filter(|ctx| ctx.role != Role::None),
        }
    }

    fn committee(&self, chain: Chain) -> Option<CommitteeSet> {
        let members = self.ports.chain.current_committee(chain);
        if members.is_empty() {
            return None;
        }
        match CommitteeSet::new(members) {
            Ok(committee) => Some(committee),
            Err(e) => {
                warn!(chain = %chain, error = %e, "[sc-04] Ignoring invalid committee");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
