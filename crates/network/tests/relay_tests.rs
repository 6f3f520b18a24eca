//! Relay fan-out tests

mod common;

use common::{add_peer, add_peer_with, RecordingConnection};
use ela_config::NodeConfig;
use ela_network::*;
use std::sync::Arc;

fn sample_tx() -> Transaction {
    Transaction {
        tx_type: 2,
        inputs: vec![OutPoint::new(UInt256::new([3u8; 32]), 0)],
        outputs: vec![TxOutput {
            asset_id: UInt256::new([1u8; 32]),
            value: 10,
            program_hash: [0x55; 21],
        }],
        lock_time: 0,
    }
}

fn sample_block() -> Block {
    Block {
        header: BlockHeader {
            height: 101,
            ..Default::default()
        },
        transactions: vec![sample_tx()],
    }
}

fn load_filter(node: &PeerNode) {
    node.bloom_filter()
        .reload(&FilterLoadPayload {
            filter: vec![0u8; 256],
            hash_funcs: 4,
            tweak: 7,
        })
        .expect("valid filter");
}

fn setup() -> (Arc<PeerNode>, Arc<NeighbourTable>, RelayBroadcaster) {
    let local = Arc::new(PeerNode::local(&NodeConfig::default()));
    let table = Arc::new(NeighbourTable::new());
    let relay = RelayBroadcaster::new(local.clone(), table.clone());
    (local, table, relay)
}

#[test]
fn test_transaction_full_send_and_filtered_announcement() {
    let (local, table, relay) = setup();
    let tx = sample_tx();

    let (origin, origin_conn) = add_peer(&table, 1, 0, true);
    let (_plain, plain_conn) = add_peer(&table, 2, 0, true);
    let (filtered, filtered_conn) = add_peer(&table, 3, 0, true);
    load_filter(&filtered);
    filtered.bloom_filter().add(tx.hash().as_bytes());

    let report = relay
        .relay(Some(&origin), &RelayInventory::Transaction(tx.clone()))
        .expect("relay succeeds");

    assert_eq!(report, RelayReport { full: 1, announced: 1 });
    assert!(origin_conn.sent().is_empty());
    assert_eq!(plain_conn.sent(), vec![OutboundMessage::Transaction(tx.clone())]);
    assert_eq!(
        filtered_conn.sent(),
        vec![OutboundMessage::Inventory(InvPayload::single(
            InventoryType::Transaction,
            tx.hash()
        ))]
    );
    assert_eq!(local.tx_count(), 1);
}

#[test]
fn test_unmatched_filter_falls_back_to_relay_flag() {
    let (local, table, relay) = setup();
    let (filtered, filtered_conn) = add_peer(&table, 4, 0, true);
    load_filter(&filtered);
    let (_quiet, quiet_conn) = add_peer(&table, 5, 0, false);

    let tx = sample_tx();
    let report = relay
        .relay(None, &RelayInventory::Transaction(tx.clone()))
        .expect("relay succeeds");

    assert_eq!(report.full, 1);
    assert_eq!(filtered_conn.sent(), vec![OutboundMessage::Transaction(tx)]);
    assert!(quiet_conn.sent().is_empty());
    assert_eq!(local.tx_count(), 1);
}

#[test]
fn test_suppressed_while_syncing_headers() {
    let (local, table, relay) = setup();
    let (origin, _) = add_peer(&table, 1, 0, true);
    let (_other, other_conn) = add_peer(&table, 2, 0, true);
    local.sync_flags().set_syncing_headers(true);

    let report = relay
        .relay(Some(&origin), &RelayInventory::Block(sample_block()))
        .expect("suppressed relay is not an error");
    assert!(report.is_empty());
    assert!(other_conn.sent().is_empty());

    let report = relay
        .relay(None, &RelayInventory::Block(sample_block()))
        .expect("local relay proceeds");
    assert_eq!(report.full, 2);
    assert_eq!(other_conn.sent().len(), 1);
}

#[test]
fn test_block_relay() {
    let (_local, table, relay) = setup();
    let block = sample_block();

    let (filtered, filtered_conn) = add_peer(&table, 1, 0, false);
    load_filter(&filtered);
    let (_full, full_conn) = add_peer(&table, 2, 0, true);
    let (_quiet, quiet_conn) = add_peer(&table, 3, 0, false);

    let report = relay
        .relay(None, &RelayInventory::Block(block.clone()))
        .expect("relay succeeds");

    assert_eq!(report, RelayReport { full: 1, announced: 1 });
    assert_eq!(
        filtered_conn.sent(),
        vec![OutboundMessage::Inventory(InvPayload::single(
            InventoryType::Block,
            block.hash()
        ))]
    );
    assert_eq!(full_conn.sent(), vec![OutboundMessage::Block(block)]);
    assert!(quiet_conn.sent().is_empty());
}

#[test]
fn test_unsupported_type_aborts() {
    let (_local, table, relay) = setup();
    let (_peer, conn) = add_peer(&table, 1, 0, true);

    let result = relay.relay(
        None,
        &RelayInventory::Extensible(ExtensiblePayload {
            category: "dBFT".to_string(),
            data: vec![1, 2, 3],
        }),
    );

    assert!(matches!(
        result,
        Err(NetworkError::UnsupportedRelayType { kind: "extensible" })
    ));
    assert!(conn.sent().is_empty());
}

#[test]
fn test_send_failure_does_not_stop_fanout_and_counts_attempts() {
    let (local, table, relay) = setup();
    add_peer_with(&table, 1, 0, true, Arc::new(RecordingConnection::failing()));
    let (_ok, ok_conn) = add_peer(&table, 2, 0, true);

    let report = relay
        .relay(None, &RelayInventory::Transaction(sample_tx()))
        .expect("relay succeeds");

    assert_eq!(report.full, 1);
    assert_eq!(ok_conn.sent().len(), 1);
    assert_eq!(local.tx_count(), 2);
}

#[test]
fn test_pending_peers_are_skipped() {
    let (_local, table, relay) = setup();
    let (pending, conn) = add_peer(&table, 1, 0, true);
    pending.set_state(PeerState::Handshake);

    let report = relay
        .relay(None, &RelayInventory::Transaction(sample_tx()))
        .expect("relay succeeds");
    assert!(report.is_empty());
    assert!(conn.sent().is_empty());
}
