//! Neighbour registry.

use crate::node::{PeerNode, PeerState};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

/// Registry of connected neighbours.
pub trait Neighbours: Send + Sync {
    /// Established neighbours.
    fn neighbour_nodes(&self) -> Vec<Arc<PeerNode>>;

    fn neighbour_count(&self) -> usize;

    /// Removes and returns the neighbour with `id`.
    fn remove_neighbour(&self, id: u64) -> Option<Arc<PeerNode>>;

    fn neighbour_heights(&self) -> Vec<u64>;
}

/// In-memory [`Neighbours`] keyed by node id.
///
/// Only peers in [`PeerState::Established`] count as neighbours.
#[derive(Debug, Default)]
pub struct NeighbourTable {
    nodes: DashMap<u64, Arc<PeerNode>>,
}

impl NeighbourTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` under its current id. Returns false if the id is taken.
    pub fn add(&self, node: Arc<PeerNode>) -> bool {
        match self.nodes.entry(node.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<Arc<PeerNode>> {
        self.nodes.get(&id).map(|entry| entry.value().clone())
    }

    /// Entries in any state.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn established(&self) -> impl Iterator<Item = Arc<PeerNode>> + '_ {
        self.nodes
            .iter()
            .filter(|entry| entry.value().state() == PeerState::Established)
            .map(|entry| entry.value().clone())
    }
}

impl Neighbours for NeighbourTable {
    fn neighbour_nodes(&self) -> Vec<Arc<PeerNode>> {
        self.established().collect()
    }

    fn neighbour_count(&self) -> usize {
        self.established().count()
    }

    fn remove_neighbour(&self, id: u64) -> Option<Arc<PeerNode>> {
        self.nodes.remove(&id).map(|(_, node)| node)
    }

    fn neighbour_heights(&self) -> Vec<u64> {
        self.established().map(|node| node.height()).collect()
    }
}
