//! In-process consensus network.
//!
//! Every engine registers with a shared hub; a broadcast is delivered
//! straight into the other engines' mailboxes. The hub holds weak handles
//! so engines and hub do not keep each other alive.

use crate::domain::BftMessage;
use crate::ports::{ConsensusEngineApi, ConsensusNetwork};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::PublicKey;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Shared hub of an in-process network.
#[derive(Default)]
pub struct LoopbackNetwork {
    peers: RwLock<Vec<(PublicKey, Weak<dyn ConsensusEngineApi>)>>,
}

impl LoopbackNetwork {
    /// Empty hub.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Network port for the node with key `me`.
    pub fn endpoint(self: &Arc<Self>, me: PublicKey) -> LoopbackEndpoint {
        LoopbackEndpoint {
            hub: self.clone(),
            me,
        }
    }

    /// Attach an engine so it receives broadcasts.
    pub fn register<E: ConsensusEngineApi + 'static>(&self, key: PublicKey, engine: &Arc<E>) {
        let weak: Weak<E> = Arc::downgrade(engine);
        let weak: Weak<dyn ConsensusEngineApi> = weak;
        self.peers.write().push((key, weak));
    }

    /// Registered peers.
    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    fn deliver_from(&self, sender: &PublicKey, msg: &BftMessage) -> usize {
        let peers: Vec<Arc<dyn ConsensusEngineApi>> = self
            .peers
            .read()
            .iter()
            .filter(|(key, _)| key != sender)
            .filter_map(|(_, peer)| peer.upgrade())
            .collect();
        let mut delivered = 0;
        for peer in peers {
            match peer.deliver(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => trace!(error = %e, kind = msg.kind(), "[sc-04] Loopback delivery skipped"),
            }
        }
        delivered
    }
}

/// One node's view of the hub.
pub struct LoopbackEndpoint {
    hub: Arc<LoopbackNetwork>,
    me: PublicKey,
}

#[async_trait]
impl ConsensusNetwork for LoopbackEndpoint {
    async fn broadcast(&self, msg: BftMessage) -> Result<(), String> {
        self.hub.deliver_from(&self.me, &msg);
        Ok(())
    }
}
