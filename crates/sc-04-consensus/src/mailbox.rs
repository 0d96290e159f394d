//! Worker mailbox.
//!
//! Peers push messages into a bounded channel. A round pulls the messages
//! for its own (chain, height); messages for a later height are stashed
//! until that round starts, and stale or foreign-chain ones are dropped.

use crate::domain::BftMessage;
use shared_types::Chain;
use std::collections::VecDeque;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// What a mailbox wait produced.
#[derive(Debug)]
pub enum Received {
    /// A message for the requested round.
    Message(BftMessage),
    /// Shutdown was signalled.
    Shutdown,
    /// Every sender is gone.
    Closed,
}

/// Receiving side of the worker mailbox.
pub struct Mailbox {
    rx: mpsc::Receiver<BftMessage>,
    stash: VecDeque<BftMessage>,
    stash_capacity: usize,
}

impl Mailbox {
    /// Wrap a channel receiver.
    pub fn new(rx: mpsc::Receiver<BftMessage>, stash_capacity: usize) -> Self {
        Self {
            rx,
            stash: VecDeque::new(),
            stash_capacity,
        }
    }

    /// Number of stashed future-height messages.
    pub fn stashed(&self) -> usize {
        self.stash.len()
    }

    /// Wait for the next message of (`chain`, `height`).
    ///
    /// Cancel safe: dropping the future loses no message.
    pub async fn next_for(
        &mut self,
        chain: Chain,
        height: u64,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Received {
        self.stash.retain(|m| m.chain() == chain && m.height() >= height);
        if let Some(pos) = self.stash.iter().position(|m| m.height() == height) {
            if let Some(msg) = self.stash.remove(pos) {
                return Received::Message(msg);
            }
        }

        loop {
            if *shutdown.borrow() {
                return Received::Shutdown;
            }
            let received = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        return Received::Shutdown;
                    }
                    continue;
                }
                msg = self.rx.recv() => msg,
            };
            let Some(msg) = received else {
                return Received::Closed;
            };

            if msg.chain() != chain {
                debug!(chain = %msg.chain(), kind = msg.kind(), "[sc-04] Dropping message for another chain");
            } else if msg.height() < height {
                debug!(height = msg.height(), current = height, kind = msg.kind(), "[sc-04] Dropping stale message");
            } else if msg.height() > height {
                self.stash_future(msg);
            } else {
                return Received::Message(msg);
            }
        }
    }

    /// Drop everything queued. Used while the node holds no role.
    pub fn discard_queued(&mut self) -> usize {
        let mut dropped = self.stash.len();
        self.stash.clear();
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    fn stash_future(&mut self, msg: BftMessage) {
        if self.stash_capacity == 0 {
            return;
        }
        if self.stash.len() >= self.stash_capacity {
            if let Some(evicted) = self.stash.pop_front() {
                warn!(
                    height = evicted.height(),
                    kind = evicted.kind(),
                    "[sc-04] Stash full, evicting oldest message"
                );
            }
        }
        self.stash.push_back(msg);
    }
}
