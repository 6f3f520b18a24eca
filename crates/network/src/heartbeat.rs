//! Periodic connection maintenance and sync triggering.

use crate::sync::SyncCoordinator;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Work performed on every heartbeat.
#[async_trait]
pub trait HeartbeatDriver: Send + Sync {
    /// Dials peers until the neighbour target is met.
    async fn connect_nodes(&self);

    /// Requests missing headers and blocks from neighbours.
    async fn sync_blocks(&self);
}

/// Runs the heartbeat until `cancel` fires.
///
/// Connects once, waits for a first neighbour, then on every tick starts a
/// connection pass and a sync pass without waiting for the previous ones.
/// Passes still running when `cancel` fires are aborted before returning.
pub async fn run_heartbeat(
    driver: Arc<dyn HeartbeatDriver>,
    coordinator: Arc<SyncCoordinator>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => {
            debug!("heartbeat cancelled during startup");
            return;
        }
        _ = async {
            driver.connect_nodes().await;
            coordinator.wait_for_neighbour_connections(&cancel).await;
        } => {}
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut passes = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(_) = passes.join_next(), if !passes.is_empty() => {}
            _ = ticker.tick() => {
                trace!(running = passes.len(), "heartbeat");
                let connect = driver.clone();
                passes.spawn(async move { connect.connect_nodes().await });
                let sync = driver.clone();
                passes.spawn(async move { sync.sync_blocks().await });
            }
        }
    }

    passes.shutdown().await;
    debug!("heartbeat stopped");
}
