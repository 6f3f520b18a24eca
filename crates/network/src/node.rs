//! Per-peer state.
//!
//! A [`PeerNode`] stands for either the local node or one connected remote
//! peer. Handshake fields live behind one lock so [`PeerNode::update_info`]
//! publishes them together; the sync flags, requested-block ledger and
//! connection-attempt registry each keep their own lock.

use crate::{
    bloom::BloomFilter,
    connecting::ConnectingNodes,
    error::{NetworkError, NetworkResult},
    payloads::{OutboundMessage, VersionPayload},
    requested_blocks::RequestedBlockList,
    sync::SyncFlags,
    sync_gate::SyncGate,
    types::UInt256,
};
use ela_config::NodeConfig;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Transport handle of a connected peer.
pub trait Connection: Send + Sync + fmt::Debug {
    fn send(&self, message: OutboundMessage) -> NetworkResult<()>;

    fn close(&self);
}

/// Connection state of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerState {
    /// Connected, nothing exchanged yet
    Init,
    /// Version sent
    Hand,
    /// Version received
    Handshake,
    /// Verack exchanged
    Handshaked,
    /// Ready for relay and sync
    Established,
    /// Disconnected
    Inactive,
}

#[derive(Debug, Clone)]
struct HandshakeInfo {
    id: u64,
    version: u32,
    services: u64,
    port: u16,
    relay: bool,
    height: u64,
    last_active: SystemTime,
}

/// A node in the network, local or remote.
#[derive(Debug)]
pub struct PeerNode {
    info: RwLock<HandshakeInfo>,
    state: RwLock<PeerState>,
    addr: String,
    external: AtomicBool,
    http_info_port: RwLock<Option<u16>>,
    tx_count: AtomicU64,
    rx_tx_count: AtomicU64,
    connection: Option<Arc<dyn Connection>>,
    filter: BloomFilter,
    sync_flags: SyncFlags,
    requested_blocks: RequestedBlockList,
    connecting: ConnectingNodes,
    sync_gate: SyncGate,
    header_range: Mutex<(UInt256, UInt256)>,
}

/// Derives a node id from the current time in nanoseconds.
pub fn generate_node_id() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let digest = Sha256::digest(nanos.to_string().as_bytes());
    let mut id = [0u8; 8];
    id.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(id)
}

impl PeerNode {
    fn with_parts(
        info: HandshakeInfo,
        addr: String,
        connection: Option<Arc<dyn Connection>>,
        max_sync_requests: usize,
    ) -> Self {
        Self {
            info: RwLock::new(info),
            state: RwLock::new(PeerState::Init),
            addr,
            external: AtomicBool::new(false),
            http_info_port: RwLock::new(None),
            tx_count: AtomicU64::new(0),
            rx_tx_count: AtomicU64::new(0),
            connection,
            filter: BloomFilter::new(),
            sync_flags: SyncFlags::default(),
            requested_blocks: RequestedBlockList::new(),
            connecting: ConnectingNodes::new(),
            sync_gate: SyncGate::new(max_sync_requests),
            header_range: Mutex::new((UInt256::ZERO, UInt256::ZERO)),
        }
    }

    /// Builds the local node from configuration.
    pub fn local(config: &NodeConfig) -> Self {
        let info = HandshakeInfo {
            id: generate_node_id(),
            version: config.protocol_version,
            services: config.services(),
            port: config.node_port,
            relay: true,
            height: 0,
            last_active: SystemTime::now(),
        };
        let node = Self::with_parts(
            info,
            String::new(),
            None,
            config.max_sync_header_requests,
        );
        *node.http_info_port.write() = config.http_info_port;
        node
    }

    /// Builds a remote peer record; its id arrives with the handshake.
    pub fn remote(
        addr: impl Into<String>,
        connection: Arc<dyn Connection>,
        max_sync_requests: usize,
    ) -> Self {
        let info = HandshakeInfo {
            id: 0,
            version: 0,
            services: 0,
            port: 0,
            relay: false,
            height: 0,
            last_active: SystemTime::now(),
        };
        Self::with_parts(info, addr.into(), Some(connection), max_sync_requests)
    }

    /// Applies a peer's version message in one step.
    pub fn update_info(&self, last_active: SystemTime, payload: &VersionPayload) {
        let mut info = self.info.write();
        info.last_active = last_active;
        info.id = payload.nonce;
        info.version = payload.version;
        info.services = payload.services;
        info.port = payload.port;
        info.relay = payload.relay != 0;
        info.height = payload.height;
    }

    /// Node id; zero for a remote peer before its handshake.
    pub fn id(&self) -> u64 {
        self.info.read().id
    }

    /// Advertised protocol version.
    pub fn version(&self) -> u32 {
        self.info.read().version
    }

    /// Advertised service bitmask.
    pub fn services(&self) -> u64 {
        self.info.read().services
    }

    /// Advertised listening port.
    pub fn port(&self) -> u16 {
        self.info.read().port
    }

    /// Whether the peer accepts relayed transactions and blocks.
    pub fn is_relay(&self) -> bool {
        self.info.read().relay
    }

    /// Time of the last handshake or activity update.
    pub fn last_active(&self) -> SystemTime {
        self.info.read().last_active
    }

    /// Records activity at `at`.
    pub fn set_last_active(&self, at: SystemTime) {
        self.info.write().last_active = at;
    }

    /// Last known chain height.
    pub fn height(&self) -> u64 {
        self.info.read().height
    }

    /// Overwrites the known chain height.
    pub fn set_height(&self, height: u64) {
        self.info.write().height = height;
    }

    /// Current connection state.
    pub fn state(&self) -> PeerState {
        *self.state.read()
    }

    /// Moves the peer to `state`.
    pub fn set_state(&self, state: PeerState) {
        *self.state.write() = state;
    }

    /// Remote address as given at construction; empty for the local node.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Peer address as 16 bytes, IPv4 addresses in IPv6-mapped form.
    pub fn addr16(&self) -> NetworkResult<[u8; 16]> {
        let ip = self
            .addr
            .parse::<SocketAddr>()
            .map(|socket| socket.ip())
            .or_else(|_| self.addr.parse::<IpAddr>())
            .map_err(|_| NetworkError::InvalidAddress {
                address: self.addr.clone(),
            })?;
        Ok(match ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
            IpAddr::V6(v6) => v6.octets(),
        })
    }

    /// Whether the peer sits behind NAT or a relay.
    pub fn is_external(&self) -> bool {
        self.external.load(Ordering::Relaxed)
    }

    /// Marks the peer as external.
    pub fn set_external(&self, external: bool) {
        self.external.store(external, Ordering::Relaxed);
    }

    /// HTTP info port, if advertised.
    pub fn http_info_port(&self) -> Option<u16> {
        *self.http_info_port.read()
    }

    /// Replaces the HTTP info port.
    pub fn set_http_info_port(&self, port: Option<u16>) {
        *self.http_info_port.write() = port;
    }

    /// Full-transaction relay attempts made by this node.
    pub fn tx_count(&self) -> u64 {
        self.tx_count.load(Ordering::Relaxed)
    }

    /// Counts one full-transaction relay attempt.
    pub fn inc_tx_count(&self) {
        self.tx_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Transactions received from this peer.
    pub fn rx_tx_count(&self) -> u64 {
        self.rx_tx_count.load(Ordering::Relaxed)
    }

    /// Counts one received transaction.
    pub fn inc_rx_tx_count(&self) {
        self.rx_tx_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Transport handle; `None` for the local node.
    pub fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.connection.as_ref()
    }

    /// SPV filter loaded by this peer.
    pub fn bloom_filter(&self) -> &BloomFilter {
        &self.filter
    }

    /// Header-sync and sync-failed flags.
    pub fn sync_flags(&self) -> &SyncFlags {
        &self.sync_flags
    }

    /// Blocks requested and not yet received.
    pub fn requested_blocks(&self) -> &RequestedBlockList {
        &self.requested_blocks
    }

    /// Outbound dials in flight.
    pub fn connecting_nodes(&self) -> &ConnectingNodes {
        &self.connecting
    }

    /// Permit pool bounding concurrent sync requests.
    pub fn sync_gate(&self) -> &SyncGate {
        &self.sync_gate
    }

    /// First hash of the active header-sync range.
    pub fn start_hash(&self) -> UInt256 {
        self.header_range.lock().0
    }

    /// Sets the first hash of the header-sync range.
    pub fn set_start_hash(&self, hash: UInt256) {
        self.header_range.lock().0 = hash;
    }

    /// Last hash of the active header-sync range.
    pub fn stop_hash(&self) -> UInt256 {
        self.header_range.lock().1
    }

    /// Sets the last hash of the header-sync range.
    pub fn set_stop_hash(&self, hash: UInt256) {
        self.header_range.lock().1 = hash;
    }

    pub(crate) fn set_header_range(&self, start: UInt256, stop: UInt256) {
        *self.header_range.lock() = (start, stop);
    }

    /// Hands `message` to this peer's transport.
    pub fn send(&self, message: OutboundMessage) -> NetworkResult<()> {
        match &self.connection {
            Some(connection) => connection.send(message),
            None => Err(NetworkError::NotConnected { id: self.id() }),
        }
    }

    /// Marks the peer inactive and closes its transport.
    pub fn disconnect(&self) {
        self.set_state(PeerState::Inactive);
        if let Some(connection) = &self.connection {
            connection.close();
        }
        debug!(id = %format!("0x{:x}", self.id()), addr = %self.addr, "node disconnected");
    }
}
