//! In-flight outbound connection attempts.

use crate::error::NetworkResult;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Addresses currently being dialed.
#[derive(Debug, Default)]
pub struct ConnectingNodes {
    addresses: Mutex<HashSet<String>>,
}

impl ConnectingNodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `addr` as being dialed. Returns false if an attempt is already in flight.
    pub fn add(&self, addr: &str) -> bool {
        self.addresses.lock().insert(addr.to_string())
    }

    pub fn del(&self, addr: &str) {
        self.addresses.lock().remove(addr);
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.addresses.lock().contains(addr)
    }

    pub fn len(&self) -> usize {
        self.addresses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.lock().is_empty()
    }
}

/// Outbound transport dialer.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, addr: &str) -> NetworkResult<()>;
}

/// Dials `addr` unless an attempt to it is already running.
///
/// Returns `false` when the attempt was skipped. The registry entry is
/// removed once the dial resolves, whatever its outcome.
pub async fn dial_once<D: Dialer + ?Sized>(
    connecting: &ConnectingNodes,
    addr: &str,
    dialer: &D,
) -> bool {
    if !connecting.add(addr) {
        debug!(address = %addr, "connection attempt already in flight");
        return false;
    }

    if let Err(error) = dialer.dial(addr).await {
        warn!(address = %addr, %error, "failed to connect to peer");
    }

    connecting.del(addr);
    true
}
