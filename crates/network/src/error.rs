//! Error types for the peer-to-peer core.

use ela_config::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Network-related errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Peer address could not be converted to its 16-byte form.
    #[error("invalid peer address: {address}")]
    InvalidAddress { address: String },

    /// Relay was asked to forward a message kind it does not carry.
    #[error("unsupported relay type: {kind}")]
    UnsupportedRelayType { kind: &'static str },

    /// Peer has no transport handle attached.
    #[error("node 0x{id:x} has no connection")]
    NotConnected { id: u64 },

    /// Transport rejected an outbound message.
    #[error("failed to send to node 0x{id:x}: {reason}")]
    Send { id: u64, reason: String },

    /// Filter load payload exceeds protocol limits.
    #[error("invalid bloom filter: {0}")]
    InvalidFilter(String),

    /// Admission gate was closed while waiting for a permit.
    #[error("sync admission gate closed")]
    GateClosed,

    /// No permit became free within the allowed wait.
    #[error("no sync permit available after {waited:?}")]
    GateTimeout { waited: Duration },

    /// Node configuration failed validation.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
