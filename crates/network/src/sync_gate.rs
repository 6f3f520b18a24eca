//! Bounded concurrency over outstanding block-sync requests.

use crate::error::{NetworkError, NetworkResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Permit pool of fixed capacity.
#[derive(Debug, Clone)]
pub struct SyncGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Held while a sync request is outstanding; returns its slot on drop.
#[derive(Debug)]
pub struct SyncPermit {
    _permit: OwnedSemaphorePermit,
}

impl SyncGate {
    /// Creates a gate admitting `capacity` holders, capped at [`Semaphore::MAX_PERMITS`].
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until a permit is free.
    pub async fn acquire(&self) -> NetworkResult<SyncPermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map(|permit| SyncPermit { _permit: permit })
            .map_err(|_| NetworkError::GateClosed)
    }

    /// Takes a permit only if one is free right now.
    pub fn try_acquire(&self) -> Option<SyncPermit> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Some(SyncPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits) | Err(TryAcquireError::Closed) => None,
        }
    }

    /// Like [`SyncGate::acquire`] but gives up after `timeout`.
    pub async fn acquire_timeout(&self, timeout: Duration) -> NetworkResult<SyncPermit> {
        tokio::time::timeout(timeout, self.acquire())
            .await
            .map_err(|_| NetworkError::GateTimeout { waited: timeout })?
    }

    /// Permits free right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Total permits the gate was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Closes the gate; pending and future acquisitions fail.
    pub fn close(&self) {
        self.semaphore.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capacity_bounds_holders() {
        let gate = SyncGate::new(2);
        let first = gate.acquire().await.expect("permit");
        let _second = gate.acquire().await.expect("permit");
        assert_eq!(gate.available(), 0);
        assert!(gate.try_acquire().is_none());

        drop(first);
        assert_eq!(gate.available(), 1);
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_blocked_acquire_released_by_holder() {
        let gate = SyncGate::new(1);
        let held = gate.acquire().await.expect("permit");

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter
            .await
            .expect("task panicked")
            .expect("waiter should be admitted");
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_acquire_timeout() {
        let gate = SyncGate::new(1);
        let _held = gate.acquire().await.expect("permit");

        let result = gate.acquire_timeout(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(NetworkError::GateTimeout { .. })));
    }

    #[test]
    fn test_oversized_capacity_is_capped() {
        let gate = SyncGate::new(usize::MAX);
        assert_eq!(gate.capacity(), Semaphore::MAX_PERMITS);
        assert_eq!(gate.available(), Semaphore::MAX_PERMITS);
    }

    #[tokio::test]
    async fn test_closed_gate_rejects() {
        let gate = SyncGate::new(1);
        gate.close();
        assert!(matches!(gate.acquire().await, Err(NetworkError::GateClosed)));
        assert_eq!(gate.capacity(), 1);
    }
}
