//! Chain objects carried by relay: hashes, transactions and blocks.
//!
//! Only the fields the relay and filter paths read are modelled. Hashes are
//! double SHA-256 over a fixed little-endian layout.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length in bytes of an output program hash.
pub const PROGRAM_HASH_SIZE: usize = 21;

/// 256-bit hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct UInt256([u8; 32]);

impl UInt256 {
    pub const ZERO: UInt256 = UInt256([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Double SHA-256 of `data`.
    pub fn sha256d(data: &[u8]) -> Self {
        let first = Sha256::digest(data);
        let second = Sha256::digest(first);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&second);
        Self(bytes)
    }
}

impl From<[u8; 32]> for UInt256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

impl fmt::Debug for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt256({})", self)
    }
}

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_id: UInt256,
    pub index: u16,
}

impl OutPoint {
    pub fn new(tx_id: UInt256, index: u16) -> Self {
        Self { tx_id, index }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(34);
        bytes.extend_from_slice(self.tx_id.as_bytes());
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub asset_id: UInt256,
    pub value: i64,
    pub program_hash: [u8; PROGRAM_HASH_SIZE],
}

/// A transaction as seen by relay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_type: u8,
    pub inputs: Vec<OutPoint>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    fn write_unsigned(&self, buf: &mut Vec<u8>) {
        buf.push(self.tx_type);
        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(&input.to_bytes());
        }
        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(output.asset_id.as_bytes());
            buf.extend_from_slice(&output.value.to_le_bytes());
            buf.extend_from_slice(&output.program_hash);
        }
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
    }

    /// Transaction id.
    pub fn hash(&self) -> UInt256 {
        let mut buf = Vec::with_capacity(64);
        self.write_unsigned(&mut buf);
        UInt256::sha256d(&buf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block: UInt256,
    pub merkle_root: UInt256,
    pub timestamp: u32,
    pub height: u32,
    pub nonce: u64,
}

impl BlockHeader {
    pub fn hash(&self) -> UInt256 {
        let mut buf = Vec::with_capacity(84);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(self.prev_block.as_bytes());
        buf.extend_from_slice(self.merkle_root.as_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        UInt256::sha256d(&buf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Block hash; identical to the header hash.
    pub fn hash(&self) -> UInt256 {
        self.header.hash()
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(lock_time: u32) -> Transaction {
        Transaction {
            tx_type: 2,
            inputs: vec![OutPoint::new(UInt256::new([7u8; 32]), 1)],
            outputs: vec![TxOutput {
                asset_id: UInt256::new([1u8; 32]),
                value: 100_000_000,
                program_hash: [0x21; PROGRAM_HASH_SIZE],
            }],
            lock_time,
        }
    }

    #[test]
    fn test_transaction_hash_depends_on_content() {
        let a = sample_tx(0);
        let b = sample_tx(1);
        assert_eq!(a.hash(), a.clone().hash());
        assert_ne!(a.hash(), b.hash());
        assert!(!a.hash().is_zero());
    }

    #[test]
    fn test_block_hash_is_header_hash() {
        let block = Block {
            header: BlockHeader {
                height: 42,
                ..Default::default()
            },
            transactions: vec![sample_tx(0)],
        };
        assert_eq!(block.hash(), block.header.hash());
        assert_eq!(block.height(), 42);
    }

    #[test]
    fn test_uint256_display_is_reversed_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = UInt256::new(bytes);
        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.ends_with("ab"));
    }

    #[test]
    fn test_outpoint_bytes_layout() {
        let point = OutPoint::new(UInt256::new([3u8; 32]), 0x0102);
        let bytes = point.to_bytes();
        assert_eq!(bytes.len(), 34);
        assert_eq!(&bytes[32..], &[0x02, 0x01]);
    }
}
