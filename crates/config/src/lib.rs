//! ELA Configuration Module
//!
//! Protocol constants and the node configuration document consumed by the
//! peer-to-peer layer at startup.

mod error;
mod node_config;

pub use error::{ConfigError, ConfigResult};
pub use node_config::{load, NodeConfig};

/// Protocol version advertised in the version handshake
pub const PROTOCOL_VERSION: u32 = 0;

/// Service bit advertised by nodes that expose open services
pub const OPEN_SERVICE: u64 = 1 << 2;

/// Ceiling on concurrent block-sync requests
pub const MAX_SYNC_HDR_REQ: usize = 2;

/// Largest accepted value for `max_sync_header_requests`
pub const MAX_SYNC_HDR_REQ_LIMIT: usize = 1024;

/// Interval between heartbeat passes (seconds)
pub const HEARTBEAT_DURATION_SECS: u64 = 6;

/// Default ELA node port
pub const DEFAULT_NODE_PORT: u16 = 20338;

/// Maximum block size accepted from peers
pub const MAX_BLOCK_SIZE: usize = 8_000_000;

/// Main network magic number
pub const MAINNET_MAGIC: u32 = 2_017_001;

/// Interval between checks while waiting for sync to finish (seconds)
pub const SYNC_POLL_INTERVAL_SECS: u64 = 5;

/// Upper bound on the startup wait for a first neighbour (seconds)
pub const NEIGHBOUR_WAIT_TIMEOUT_SECS: u64 = 10;

/// Poll interval of the startup neighbour wait (milliseconds)
pub const NEIGHBOUR_POLL_INTERVAL_MILLIS: u64 = 100;

/// Maximum size of a loaded SPV bloom filter in bytes
pub const MAX_BLOOM_FILTER_SIZE: usize = 36_000;

/// Maximum number of hash functions of a loaded SPV bloom filter
pub const MAX_BLOOM_HASH_FUNCS: u32 = 50;
