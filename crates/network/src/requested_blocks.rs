//! Ledger of block hashes requested from peers.

use crate::types::UInt256;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Block hashes requested from peers with the time of the latest request.
///
/// Entries never expire on their own; [`RequestedBlockList::stale`] lets the
/// download driver find requests that have been outstanding too long.
#[derive(Debug, Default)]
pub struct RequestedBlockList {
    requests: Mutex<HashMap<UInt256, Instant>>,
}

impl RequestedBlockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request for `hash`, restarting its clock if already present.
    pub fn add(&self, hash: UInt256) {
        self.requests.lock().insert(hash, Instant::now());
    }

    pub fn contains(&self, hash: &UInt256) -> bool {
        self.requests.lock().contains_key(hash)
    }

    pub fn remove(&self, hash: &UInt256) {
        self.requests.lock().remove(hash);
    }

    /// Forgets every outstanding request.
    pub fn reset(&self) {
        self.requests.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    /// Copy of the hash to request-time mapping.
    pub fn snapshot(&self) -> HashMap<UInt256, Instant> {
        self.requests.lock().clone()
    }

    /// Hashes whose latest request is at least `timeout` old.
    pub fn stale(&self, timeout: Duration) -> Vec<UInt256> {
        let now = Instant::now();
        self.requests
            .lock()
            .iter()
            .filter(|(_, requested)| now.saturating_duration_since(**requested) >= timeout)
            .map(|(hash, _)| *hash)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(n: u8) -> UInt256 {
        UInt256::new([n; 32])
    }

    #[test]
    fn test_add_contains_remove() {
        let list = RequestedBlockList::new();
        list.add(hash(1));
        assert!(list.contains(&hash(1)));
        assert!(!list.contains(&hash(2)));

        list.remove(&hash(1));
        assert!(!list.contains(&hash(1)));
        list.remove(&hash(1));
        assert!(list.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let list = RequestedBlockList::new();
        for n in 0..10 {
            list.add(hash(n));
        }
        assert_eq!(list.len(), 10);

        list.reset();
        assert!((0..10).all(|n| !list.contains(&hash(n))));
    }

    #[test]
    fn test_re_add_refreshes_timestamp() {
        let list = RequestedBlockList::new();
        list.add(hash(1));
        let first = list.snapshot()[&hash(1)];

        std::thread::sleep(Duration::from_millis(5));
        list.add(hash(1));
        let second = list.snapshot()[&hash(1)];

        assert_eq!(list.len(), 1);
        assert!(second > first);
    }

    #[test]
    fn test_stale_does_not_remove() {
        let list = RequestedBlockList::new();
        list.add(hash(1));
        std::thread::sleep(Duration::from_millis(20));
        list.add(hash(2));

        let stale = list.stale(Duration::from_millis(15));
        assert_eq!(stale, vec![hash(1)]);
        assert_eq!(list.len(), 2);

        assert_eq!(list.stale(Duration::ZERO).len(), 2);
    }
}
