//! Transaction and block propagation to neighbours.
//!
//! Peers with a loaded bloom filter receive inventory announcements and pull
//! what they need. Other relay-eligible peers receive the full object. While
//! the local node is syncing headers, objects that arrived from a peer are
//! not forwarded at all.

use crate::{
    error::{NetworkError, NetworkResult},
    neighbours::Neighbours,
    node::PeerNode,
    payloads::{InvPayload, InventoryType, OutboundMessage, RelayInventory},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one relay call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Full transactions or blocks sent
    pub full: usize,
    /// Inventory announcements sent
    pub announced: usize,
}

impl RelayReport {
    pub fn is_empty(&self) -> bool {
        self.full == 0 && self.announced == 0
    }
}

pub struct RelayBroadcaster {
    local: Arc<PeerNode>,
    neighbours: Arc<dyn Neighbours>,
}

impl RelayBroadcaster {
    pub fn new(local: Arc<PeerNode>, neighbours: Arc<dyn Neighbours>) -> Self {
        Self { local, neighbours }
    }

    /// Forwards `inventory` to every neighbour except `from`.
    ///
    /// `from` is `None` for locally originated objects.
    pub fn relay(
        &self,
        from: Option<&PeerNode>,
        inventory: &RelayInventory,
    ) -> NetworkResult<RelayReport> {
        let mut report = RelayReport::default();
        if from.is_some() && self.local.sync_flags().is_syncing_headers() {
            return Ok(report);
        }

        if let RelayInventory::Extensible(_) = inventory {
            warn!(kind = inventory.kind(), "unknown relay message type");
            return Err(NetworkError::UnsupportedRelayType {
                kind: inventory.kind(),
            });
        }

        let origin = from.map(PeerNode::id);
        for neighbour in self.neighbours.neighbour_nodes() {
            if origin == Some(neighbour.id()) {
                continue;
            }

            match inventory {
                RelayInventory::Transaction(tx) => {
                    debug!("relay transaction message");
                    let filter = neighbour.bloom_filter();
                    if filter.is_loaded() && filter.match_tx_and_update(tx) {
                        let inv = InvPayload::single(InventoryType::Transaction, tx.hash());
                        if deliver(&neighbour, OutboundMessage::Inventory(inv)) {
                            report.announced += 1;
                        }
                        continue;
                    }

                    if neighbour.is_relay() {
                        self.local.inc_tx_count();
                        if deliver(&neighbour, OutboundMessage::Transaction(tx.clone())) {
                            report.full += 1;
                        }
                    }
                }
                RelayInventory::Block(block) => {
                    debug!("relay block message");
                    if neighbour.bloom_filter().is_loaded() {
                        let inv = InvPayload::single(InventoryType::Block, block.hash());
                        if deliver(&neighbour, OutboundMessage::Inventory(inv)) {
                            report.announced += 1;
                        }
                        continue;
                    }

                    if neighbour.is_relay()
                        && deliver(&neighbour, OutboundMessage::Block(block.clone()))
                    {
                        report.full += 1;
                    }
                }
                RelayInventory::Extensible(_) => {}
            }
        }

        Ok(report)
    }
}

fn deliver(neighbour: &PeerNode, message: OutboundMessage) -> bool {
    let command = message.command();
    match neighbour.send(message) {
        Ok(()) => true,
        Err(error) => {
            warn!(
                id = %format!("0x{:x}", neighbour.id()),
                command,
                %error,
                "failed to relay to peer"
            );
            false
        }
    }
}
