//! Message payloads exchanged with neighbours.

use crate::types::{Block, Transaction, UInt256};
use serde::{Deserialize, Serialize};

/// Inventory type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum InventoryType {
    Transaction = 0x01,
    Block = 0x02,
}

/// Inventory announcement referencing objects by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvPayload {
    pub inventory_type: InventoryType,
    pub hashes: Vec<UInt256>,
}

impl InvPayload {
    pub fn new(inventory_type: InventoryType, hashes: Vec<UInt256>) -> Self {
        Self {
            inventory_type,
            hashes,
        }
    }

    pub fn single(inventory_type: InventoryType, hash: UInt256) -> Self {
        Self::new(inventory_type, vec![hash])
    }
}

/// Messages this core hands to a peer's transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Inventory(InvPayload),
    Transaction(Transaction),
    Block(Block),
}

impl OutboundMessage {
    pub fn command(&self) -> &'static str {
        match self {
            OutboundMessage::Inventory(_) => "inv",
            OutboundMessage::Transaction(_) => "tx",
            OutboundMessage::Block(_) => "block",
        }
    }
}

/// Application payload gossiped outside the block/tx relay path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensiblePayload {
    pub category: String,
    pub data: Vec<u8>,
}

/// Objects handed to the relay broadcaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayInventory {
    Transaction(Transaction),
    Block(Block),
    Extensible(ExtensiblePayload),
}

impl RelayInventory {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayInventory::Transaction(_) => "transaction",
            RelayInventory::Block(_) => "block",
            RelayInventory::Extensible(_) => "extensible",
        }
    }
}

/// Fields of a peer's version message consumed on handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPayload {
    pub version: u32,
    pub services: u64,
    pub timestamp: u32,
    pub port: u16,
    pub nonce: u64,
    pub height: u64,
    pub relay: u8,
}

/// SPV filter parameters sent by a lightweight peer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterLoadPayload {
    pub filter: Vec<u8>,
    pub hash_funcs: u32,
    pub tweak: u32,
}
