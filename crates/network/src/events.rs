//! Node events and the disconnect handler.

use crate::neighbours::Neighbours;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Capacity of the event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events published to the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// A peer's transport went away
    PeerDisconnected {
        /// Node id of the peer
        id: u64,
    },
}

impl NodeEvent {
    pub fn peer_disconnected(id: u64) -> Self {
        Self::PeerDisconnected { id }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            NodeEvent::PeerDisconnected { .. } => "peer_disconnected",
        }
    }
}

/// Process-wide event bus.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<NodeEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes `event`. Returns the number of subscribers that will see it.
    pub fn publish(&self, event: NodeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.sender.subscribe()
    }
}

/// Removes the peer `id` from `neighbours` and tears down its connection.
///
/// Returns false if the peer was not registered.
pub fn handle_peer_disconnected(neighbours: &dyn Neighbours, id: u64) -> bool {
    match neighbours.remove_neighbour(id) {
        Some(node) => {
            debug!(id = %format!("0x{:x}", id), "node disconnect");
            node.disconnect();
            true
        }
        None => {
            debug!(id = %format!("0x{:x}", id), "disconnect for unknown node");
            false
        }
    }
}

/// Runs [`handle_peer_disconnected`] for every disconnect event until cancelled.
pub fn spawn_disconnect_listener(
    mut events: broadcast::Receiver<NodeEvent>,
    neighbours: Arc<dyn Neighbours>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => event,
            };

            match event {
                Ok(NodeEvent::PeerDisconnected { id }) => {
                    handle_peer_disconnected(neighbours.as_ref(), id);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "disconnect listener lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
