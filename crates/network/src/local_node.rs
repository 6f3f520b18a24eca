//! Owned handle to the local node.
//!
//! [`LocalNode::initialize`] builds the local [`PeerNode`] and the services
//! around it, [`LocalNode::start`] launches the background tasks and
//! [`LocalNode::shutdown`] stops them. Components that need the local node
//! receive it from this handle.

use crate::{
    error::NetworkResult,
    events::{spawn_disconnect_listener, EventBus},
    heartbeat::{run_heartbeat, HeartbeatDriver},
    ledger::Ledger,
    neighbours::Neighbours,
    node::PeerNode,
    payloads::RelayInventory,
    relay::{RelayBroadcaster, RelayReport},
    sync::SyncCoordinator,
};
use ela_config::NodeConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct LocalNode {
    config: NodeConfig,
    node: Arc<PeerNode>,
    neighbours: Arc<dyn Neighbours>,
    ledger: Arc<dyn Ledger>,
    events: EventBus,
    coordinator: Arc<SyncCoordinator>,
    relay: RelayBroadcaster,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    neighbour_wait: Option<(Duration, Duration)>,
    sync_poll: Option<Duration>,
}

impl LocalNode {
    /// Validates `config` and builds the local node.
    pub fn initialize(
        config: NodeConfig,
        ledger: Arc<dyn Ledger>,
        neighbours: Arc<dyn Neighbours>,
    ) -> NetworkResult<Self> {
        config.validate()?;

        let node = Arc::new(PeerNode::local(&config));
        node.set_height(ledger.block_height());
        info!(id = %format!("0x{:x}", node.id()), "Init node ID");

        let coordinator = Arc::new(SyncCoordinator::new(
            node.clone(),
            neighbours.clone(),
            ledger.clone(),
            &config,
        ));
        let relay = RelayBroadcaster::new(node.clone(), neighbours.clone());

        Ok(Self {
            config,
            node,
            neighbours,
            ledger,
            events: EventBus::new(),
            coordinator,
            relay,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            neighbour_wait: None,
            sync_poll: None,
        })
    }

    /// Overrides the startup neighbour wait.
    pub fn with_neighbour_wait(mut self, timeout: Duration, poll: Duration) -> Self {
        self.neighbour_wait = Some((timeout, poll));
        self.rebuild_coordinator();
        self
    }

    /// Overrides the sync-completion poll interval.
    pub fn with_sync_poll_interval(mut self, interval: Duration) -> Self {
        self.sync_poll = Some(interval);
        self.rebuild_coordinator();
        self
    }

    fn rebuild_coordinator(&mut self) {
        let mut coordinator = SyncCoordinator::new(
            self.node.clone(),
            self.neighbours.clone(),
            self.ledger.clone(),
            &self.config,
        );
        if let Some((timeout, poll)) = self.neighbour_wait {
            coordinator = coordinator.with_neighbour_wait(timeout, poll);
        }
        if let Some(interval) = self.sync_poll {
            coordinator = coordinator.with_poll_interval(interval);
        }
        self.coordinator = Arc::new(coordinator);
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn node(&self) -> &Arc<PeerNode> {
        &self.node
    }

    pub fn neighbours(&self) -> &Arc<dyn Neighbours> {
        &self.neighbours
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    pub fn need_sync(&self) -> bool {
        self.coordinator.need_sync()
    }

    pub fn relay(
        &self,
        from: Option<&PeerNode>,
        inventory: &RelayInventory,
    ) -> NetworkResult<RelayReport> {
        self.relay.relay(from, inventory)
    }

    /// Blocks until caught up with neighbours or until shutdown.
    pub async fn wait_for_sync_finish(&self) -> bool {
        self.coordinator.wait_for_sync_finish(&self.cancel).await
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.lock().is_empty() && !self.cancel.is_cancelled()
    }

    /// Spawns the disconnect listener and the heartbeat.
    pub fn start(&self, driver: Arc<dyn HeartbeatDriver>) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            warn!("local node already started");
            return;
        }

        tasks.push(spawn_disconnect_listener(
            self.events.subscribe(),
            self.neighbours.clone(),
            self.cancel.child_token(),
        ));
        tasks.push(tokio::spawn(run_heartbeat(
            driver,
            self.coordinator.clone(),
            self.config.heartbeat_interval(),
            self.cancel.child_token(),
        )));
    }

    /// Signals background tasks and pending waits to stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stops background tasks and waits for them to exit.
    pub async fn shutdown(self) {
        self.stop();
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(error) = task.await {
                warn!(%error, "background task failed during shutdown");
            }
        }
        debug!(id = %format!("0x{:x}", self.node.id()), "local node shut down");
    }
}

impl Drop for LocalNode {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
