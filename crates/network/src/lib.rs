//! ELA peer-to-peer core.
//!
//! Per-peer state, header/block synchronization bookkeeping and bloom-aware
//! relay for an ELA full node. Transport, handshake and the chain itself are
//! collaborators reached through the [`Connection`], [`Neighbours`] and
//! [`Ledger`] traits.

pub mod bloom;
pub mod connecting;
pub mod error;
pub mod events;
pub mod heartbeat;
pub mod ledger;
pub mod local_node;
pub mod neighbours;
pub mod node;
pub mod payloads;
pub mod relay;
pub mod requested_blocks;
pub mod sync;
pub mod sync_gate;
pub mod types;

pub use bloom::BloomFilter;
pub use connecting::{dial_once, ConnectingNodes, Dialer};
pub use error::{NetworkError, NetworkResult};
pub use events::{handle_peer_disconnected, spawn_disconnect_listener, EventBus, NodeEvent};
pub use heartbeat::{run_heartbeat, HeartbeatDriver};
pub use ledger::{Ledger, LedgerStats};
pub use local_node::LocalNode;
pub use neighbours::{NeighbourTable, Neighbours};
pub use node::{generate_node_id, Connection, PeerNode, PeerState};
pub use payloads::{
    ExtensiblePayload, FilterLoadPayload, InvPayload, InventoryType, OutboundMessage,
    RelayInventory, VersionPayload,
};
pub use relay::{RelayBroadcaster, RelayReport};
pub use requested_blocks::RequestedBlockList;
pub use sync::{compare_height, SyncCoordinator, SyncFlags, SyncProgress, SyncStatus};
pub use sync_gate::{SyncGate, SyncPermit};
pub use types::{Block, BlockHeader, OutPoint, Transaction, TxOutput, UInt256};
