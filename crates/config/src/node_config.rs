//! Node configuration document.
//!
//! Mirrors the startup parameters the peer-to-peer layer reads once: network
//! magic, message size ceiling, listening port, service advertisement, seed
//! list, sync request ceiling, protocol version and heartbeat interval.

use crate::{
    ConfigError, ConfigResult, DEFAULT_NODE_PORT, HEARTBEAT_DURATION_SECS, MAINNET_MAGIC,
    MAX_BLOCK_SIZE, MAX_SYNC_HDR_REQ, MAX_SYNC_HDR_REQ_LIMIT, OPEN_SERVICE, PROTOCOL_VERSION,
    SYNC_POLL_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Network magic number
    pub magic: u32,

    /// Maximum message (block) size accepted by the framing layer
    pub max_block_size: usize,

    /// Listening port for inbound connections
    pub node_port: u16,

    /// Optional HTTP info port advertised to peers
    pub http_info_port: Option<u16>,

    /// Advertise the open-service bit
    pub open_service: bool,

    /// Seed peers; an empty list skips synchronization entirely
    pub seed_list: Vec<String>,

    /// Ceiling on concurrent block-sync requests
    pub max_sync_header_requests: usize,

    /// Protocol version advertised during handshake
    pub protocol_version: u32,

    /// Heartbeat interval in seconds
    pub heartbeat_secs: u64,

    /// Interval between sync-completion checks in seconds
    pub sync_poll_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            magic: MAINNET_MAGIC,
            max_block_size: MAX_BLOCK_SIZE,
            node_port: DEFAULT_NODE_PORT,
            http_info_port: None,
            open_service: false,
            seed_list: Vec::new(),
            max_sync_header_requests: MAX_SYNC_HDR_REQ,
            protocol_version: PROTOCOL_VERSION,
            heartbeat_secs: HEARTBEAT_DURATION_SECS,
            sync_poll_secs: SYNC_POLL_INTERVAL_SECS,
        }
    }
}

impl NodeConfig {
    /// Creates a configuration with mainnet defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: NodeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the network magic
    pub fn with_magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// Sets the listening port
    pub fn with_node_port(mut self, port: u16) -> Self {
        self.node_port = port;
        self
    }

    /// Sets the HTTP info port
    pub fn with_http_info_port(mut self, port: u16) -> Self {
        self.http_info_port = Some(port);
        self
    }

    /// Enables or disables the open-service advertisement
    pub fn with_open_service(mut self, enable: bool) -> Self {
        self.open_service = enable;
        self
    }

    /// Replaces the seed list
    pub fn with_seed_list<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_list = seeds.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ceiling on concurrent sync requests
    pub fn with_max_sync_header_requests(mut self, max: usize) -> Self {
        self.max_sync_header_requests = max;
        self
    }

    /// Sets the heartbeat interval in seconds
    pub fn with_heartbeat_secs(mut self, secs: u64) -> Self {
        self.heartbeat_secs = secs;
        self
    }

    /// Sets the sync-completion poll interval in seconds
    pub fn with_sync_poll_secs(mut self, secs: u64) -> Self {
        self.sync_poll_secs = secs;
        self
    }

    /// Service bitmask advertised by the local node
    pub fn services(&self) -> u64 {
        if self.open_service {
            OPEN_SERVICE
        } else {
            0
        }
    }

    /// Whether any seed peers are configured
    pub fn has_seeds(&self) -> bool {
        !self.seed_list.is_empty()
    }

    /// Heartbeat interval as a [`Duration`]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn sync_poll_interval(&self) -> Duration {
        Duration::from_secs(self.sync_poll_secs)
    }

    /// Validates the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_sync_header_requests == 0 {
            return Err(ConfigError::invalid(
                "max_sync_header_requests",
                "must be greater than 0",
            ));
        }

        if self.max_sync_header_requests > MAX_SYNC_HDR_REQ_LIMIT {
            return Err(ConfigError::invalid(
                "max_sync_header_requests",
                format!("must not exceed {}", MAX_SYNC_HDR_REQ_LIMIT),
            ));
        }

        if self.heartbeat_secs == 0 {
            return Err(ConfigError::invalid("heartbeat_secs", "must be greater than 0"));
        }

        if self.sync_poll_secs == 0 {
            return Err(ConfigError::invalid("sync_poll_secs", "must be greater than 0"));
        }

        if self.max_block_size == 0 {
            return Err(ConfigError::invalid("max_block_size", "must be greater than 0"));
        }

        if let Some(index) = self.seed_list.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "seed_list",
                format!("entry {} is blank", index),
            ));
        }

        Ok(())
    }
}

/// Reads the TOML file at `path` and deserializes it into a validated [`NodeConfig`].
pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<NodeConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    NodeConfig::from_toml_str(&text)
}
