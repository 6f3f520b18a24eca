//! Shared test doubles.
#![allow(dead_code)]

use async_trait::async_trait;
use ela_network::{
    Connection, HeartbeatDriver, Ledger, LedgerStats, NeighbourTable, NetworkError,
    NetworkResult, OutboundMessage, PeerNode, PeerState, VersionPayload,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Connection that records everything sent through it.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    sent: Mutex<Vec<OutboundMessage>>,
    closed: AtomicBool,
    fail: AtomicBool,
}

impl RecordingConnection {
    pub fn failing() -> Self {
        let connection = Self::default();
        connection.fail.store(true, Ordering::SeqCst);
        connection
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for RecordingConnection {
    fn send(&self, message: OutboundMessage) -> NetworkResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NetworkError::Send {
                id: 0,
                reason: "connection reset".to_string(),
            });
        }
        self.sent.lock().push(message);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Ledger with a settable height.
#[derive(Debug, Default)]
pub struct FixedLedger {
    height: AtomicU64,
}

impl FixedLedger {
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl Ledger for FixedLedger {
    fn block_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    fn stats(&self) -> LedgerStats {
        LedgerStats {
            header_index_len: self.block_height() as usize,
            block_cache_len: 0,
            orphan_count: 0,
        }
    }
}

/// Heartbeat driver counting its invocations.
#[derive(Debug, Default)]
pub struct CountingDriver {
    pub connects: AtomicUsize,
    pub syncs: AtomicUsize,
}

#[async_trait]
impl HeartbeatDriver for CountingDriver {
    async fn connect_nodes(&self) {
        self.connects.fetch_add(1, Ordering::SeqCst);
    }

    async fn sync_blocks(&self) {
        self.syncs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Builds an established peer and registers it in `table`.
pub fn add_peer(
    table: &NeighbourTable,
    id: u64,
    height: u64,
    relay: bool,
) -> (Arc<PeerNode>, Arc<RecordingConnection>) {
    add_peer_with(table, id, height, relay, Arc::new(RecordingConnection::default()))
}

pub fn add_peer_with(
    table: &NeighbourTable,
    id: u64,
    height: u64,
    relay: bool,
    connection: Arc<RecordingConnection>,
) -> (Arc<PeerNode>, Arc<RecordingConnection>) {
    let node = PeerNode::remote(format!("10.0.0.{}:20338", id), connection.clone(), 2);
    node.update_info(
        SystemTime::now(),
        &VersionPayload {
            version: 0,
            services: 0,
            timestamp: 0,
            port: 20338,
            nonce: id,
            height,
            relay: relay as u8,
        },
    );
    node.set_state(PeerState::Established);
    let node = Arc::new(node);
    assert!(table.add(node.clone()));
    (node, connection)
}
