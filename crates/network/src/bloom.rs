//! SPV bloom filter attached to each peer.
//!
//! A peer starts with no filter loaded. Lightweight peers load one with a
//! `filterload` message; from then on relay consults it to decide between
//! sending full transactions and inventory announcements. Matching a
//! transaction output inserts that output's outpoint so spends of it match
//! too.

use crate::{
    error::{NetworkError, NetworkResult},
    payloads::FilterLoadPayload,
    types::{OutPoint, Transaction},
};
use ela_config::{MAX_BLOOM_FILTER_SIZE, MAX_BLOOM_HASH_FUNCS};
use parking_lot::Mutex;
use std::io::Cursor;

const SEED_MULTIPLIER: u32 = 0xFBA4C795;

#[derive(Debug, Clone)]
struct FilterState {
    bits: Vec<u8>,
    hash_funcs: u32,
    tweak: u32,
}

impl FilterState {
    fn bit_index(&self, element: &[u8], n: u32) -> usize {
        let seed = n.wrapping_mul(SEED_MULTIPLIER).wrapping_add(self.tweak);
        // Reading from an in-memory cursor cannot fail.
        let hash = murmur3::murmur3_32(&mut Cursor::new(element), seed).unwrap_or(0);
        hash as usize % (self.bits.len() * 8)
    }

    fn contains(&self, element: &[u8]) -> bool {
        (0..self.hash_funcs).all(|n| {
            let index = self.bit_index(element, n);
            self.bits[index >> 3] & (1 << (index & 7)) != 0
        })
    }

    fn insert(&mut self, element: &[u8]) {
        for n in 0..self.hash_funcs {
            let index = self.bit_index(element, n);
            self.bits[index >> 3] |= 1 << (index & 7);
        }
    }
}

/// Peer-supplied bloom filter with interior locking.
#[derive(Debug, Default)]
pub struct BloomFilter {
    state: Mutex<Option<FilterState>>,
}

impl BloomFilter {
    /// Creates an unloaded filter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Replaces the filter with the one described by `payload`.
    pub fn reload(&self, payload: &FilterLoadPayload) -> NetworkResult<()> {
        if payload.filter.is_empty() || payload.filter.len() > MAX_BLOOM_FILTER_SIZE {
            return Err(NetworkError::InvalidFilter(format!(
                "filter size {} outside 1..={}",
                payload.filter.len(),
                MAX_BLOOM_FILTER_SIZE
            )));
        }
        if payload.hash_funcs == 0 || payload.hash_funcs > MAX_BLOOM_HASH_FUNCS {
            return Err(NetworkError::InvalidFilter(format!(
                "hash function count {} outside 1..={}",
                payload.hash_funcs, MAX_BLOOM_HASH_FUNCS
            )));
        }

        *self.state.lock() = Some(FilterState {
            bits: payload.filter.clone(),
            hash_funcs: payload.hash_funcs,
            tweak: payload.tweak,
        });
        Ok(())
    }

    /// Unloads the filter.
    pub fn clear(&self) {
        *self.state.lock() = None;
    }

    /// Adds raw data to a loaded filter. Returns false when no filter is loaded.
    pub fn add(&self, element: &[u8]) -> bool {
        match self.state.lock().as_mut() {
            Some(state) => {
                state.insert(element);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, element: &[u8]) -> bool {
        self.state
            .lock()
            .as_ref()
            .map(|state| state.contains(element))
            .unwrap_or(false)
    }

    /// Tests `tx` against the filter, inserting the outpoints of matched outputs.
    ///
    /// An unloaded filter matches nothing.
    pub fn match_tx_and_update(&self, tx: &Transaction) -> bool {
        let mut guard = self.state.lock();
        let state = match guard.as_mut() {
            Some(state) => state,
            None => return false,
        };

        let hash = tx.hash();
        let mut matched = state.contains(hash.as_bytes());

        for (index, output) in tx.outputs.iter().enumerate() {
            if state.contains(&output.program_hash) {
                matched = true;
                state.insert(&OutPoint::new(hash, index as u16).to_bytes());
            }
        }

        if matched {
            return true;
        }

        tx.inputs
            .iter()
            .any(|input| state.contains(&input.to_bytes()))
    }
}
