//! Header/block synchronization state and the waits built on it.

use crate::{ledger::Ledger, neighbours::Neighbours, node::PeerNode, types::UInt256};
use ela_config::{NodeConfig, NEIGHBOUR_POLL_INTERVAL_MILLIS, NEIGHBOUR_WAIT_TIMEOUT_SECS};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

/// Shortest accepted poll interval for the neighbour wait.
pub const MIN_NEIGHBOUR_POLL: Duration = Duration::from_millis(1);

/// Snapshot of the two synchronization flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// Header-first synchronization in progress
    pub headers_syncing: bool,
    /// Last sync attempt was abandoned
    pub failed: bool,
}

/// Synchronization flags behind a single lock.
#[derive(Debug, Default)]
pub struct SyncFlags {
    status: RwLock<SyncStatus>,
}

impl SyncFlags {
    /// Both flags read under one lock acquisition.
    pub fn status(&self) -> SyncStatus {
        *self.status.read()
    }

    /// Whether header-first sync is running.
    pub fn is_syncing_headers(&self) -> bool {
        self.status.read().headers_syncing
    }

    /// Sets the header-sync flag, leaving the failure flag untouched.
    pub fn set_syncing_headers(&self, syncing: bool) {
        self.status.write().headers_syncing = syncing;
    }

    /// Whether the last sync attempt was abandoned.
    pub fn is_sync_failed(&self) -> bool {
        self.status.read().failed
    }

    /// Sets the failure flag, leaving the header-sync flag untouched.
    pub fn set_sync_failed(&self, failed: bool) {
        self.status.write().failed = failed;
    }

    /// Writes both flags under one lock acquisition.
    pub fn set(&self, status: SyncStatus) {
        *self.status.write() = status;
    }
}

/// Local chain position relative to the neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum SyncProgress {
    /// Some neighbour is strictly higher
    Behind = -1,
    /// No neighbour is higher
    CaughtUp = 1,
}

/// Compares `local` against every neighbour height.
pub fn compare_height(local: u64, heights: &[u64]) -> SyncProgress {
    if heights.iter().any(|&height| height > local) {
        SyncProgress::Behind
    } else {
        SyncProgress::CaughtUp
    }
}

/// Drives sync decisions for the local node.
pub struct SyncCoordinator {
    local: Arc<PeerNode>,
    neighbours: Arc<dyn Neighbours>,
    ledger: Arc<dyn Ledger>,
    has_seeds: bool,
    poll_interval: Duration,
    neighbour_timeout: Duration,
    neighbour_poll: Duration,
}

impl SyncCoordinator {
    pub fn new(
        local: Arc<PeerNode>,
        neighbours: Arc<dyn Neighbours>,
        ledger: Arc<dyn Ledger>,
        config: &NodeConfig,
    ) -> Self {
        Self {
            local,
            neighbours,
            ledger,
            has_seeds: config.has_seeds(),
            poll_interval: config.sync_poll_interval(),
            neighbour_timeout: Duration::from_secs(NEIGHBOUR_WAIT_TIMEOUT_SECS),
            neighbour_poll: Duration::from_millis(NEIGHBOUR_POLL_INTERVAL_MILLIS),
        }
    }

    /// Overrides the sync-completion poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the neighbour wait bound and its poll interval.
    ///
    /// The poll interval is raised to [`MIN_NEIGHBOUR_POLL`] if shorter.
    pub fn with_neighbour_wait(mut self, timeout: Duration, poll: Duration) -> Self {
        self.neighbour_timeout = timeout;
        self.neighbour_poll = poll.max(MIN_NEIGHBOUR_POLL);
        self
    }

    /// Local node the coordinator drives.
    pub fn local(&self) -> &Arc<PeerNode> {
        &self.local
    }

    /// Whether any established neighbour is ahead of the local chain.
    pub fn need_sync(&self) -> bool {
        let heights = self.neighbours.neighbour_heights();
        compare_height(self.ledger.block_height(), &heights) == SyncProgress::Behind
    }

    /// Enters header-first sync over `start..stop`.
    pub fn start_header_sync(&self, start: UInt256, stop: UInt256) {
        self.local.set_header_range(start, stop);
        self.local.sync_flags().set(SyncStatus {
            headers_syncing: true,
            failed: false,
        });
    }

    /// Abandons the current sync and voids outstanding block requests.
    pub fn stop_syncing(&self) {
        self.local.sync_flags().set(SyncStatus {
            headers_syncing: false,
            failed: true,
        });
        self.local.requested_blocks().reset();
        warn!(height = self.ledger.block_height(), "sync abandoned");
    }

    /// Polls until no neighbour is ahead, then clears the header-sync flag.
    ///
    /// Returns immediately when no seeds are configured. Returns `false` only
    /// if `cancel` fires first.
    pub async fn wait_for_sync_finish(&self, cancel: &CancellationToken) -> bool {
        if !self.has_seeds {
            return true;
        }

        loop {
            let local_height = self.ledger.block_height();
            trace!(height = local_height, "local block height");
            info!(stats = %self.ledger.stats(), "ledger state");

            let heights = self.neighbours.neighbour_heights();
            trace!(?heights, "neighbour heights");

            if compare_height(local_height, &heights) == SyncProgress::CaughtUp {
                self.local.sync_flags().set_syncing_headers(false);
                return true;
            }

            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Waits a bounded time for a first established neighbour.
    ///
    /// Returns whether one appeared. A timeout is logged and otherwise ignored.
    pub async fn wait_for_neighbour_connections(&self, cancel: &CancellationToken) -> bool {
        if !self.has_seeds {
            return false;
        }

        let deadline = tokio::time::sleep(self.neighbour_timeout);
        tokio::pin!(deadline);
        let mut ticker = tokio::time::interval(self.neighbour_poll);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = &mut deadline => {
                    warn!("cannot connect to any neighbours, waiting for neighbour connections timed out");
                    return false;
                }
                _ = ticker.tick() => {
                    let count = self.neighbours.neighbour_count();
                    if count > 0 {
                        info!(neighbours = count, "successfully connected to neighbours");
                        return true;
                    }
                }
            }
        }
    }
}
