//! Chain collaborator consulted for local height.

use std::fmt;

/// Sizes reported by the chain for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub header_index_len: usize,
    pub block_cache_len: usize,
    pub orphan_count: usize,
}

impl fmt::Display for LedgerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index={} cache={} orphans={}",
            self.header_index_len, self.block_cache_len, self.orphan_count
        )
    }
}

/// Local chain view.
pub trait Ledger: Send + Sync {
    /// Height of the best block.
    fn block_height(&self) -> u64;

    fn stats(&self) -> LedgerStats {
        LedgerStats::default()
    }
}
