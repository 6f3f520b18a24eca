//! Configuration file loading tests

use ela_config::{load, ConfigError, NodeConfig, MAX_SYNC_HDR_REQ};
use std::io::Write;

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
magic = 7630401
node_port = 21338
http_info_port = 21333
seed_list = ["127.0.0.1:21338"]
heartbeat_secs = 3
"#
    )
    .expect("write config");

    let config = load(file.path()).expect("config should load");
    assert_eq!(config.magic, 7_630_401);
    assert_eq!(config.node_port, 21338);
    assert_eq!(config.http_info_port, Some(21333));
    assert!(config.has_seeds());
    assert_eq!(config.heartbeat_secs, 3);
    assert_eq!(config.max_sync_header_requests, MAX_SYNC_HDR_REQ);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");

    match load(&path) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {:?}", other),
    }
}

#[test]
fn test_empty_file_yields_defaults() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = load(file.path()).expect("empty config is valid");
    assert_eq!(config, NodeConfig::default());
}
