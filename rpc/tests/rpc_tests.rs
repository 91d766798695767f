use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use suncoin_emission::{EmissionPolicy, ReservedAddressTable, DISTRIBUTION_ADDRESSES};
use suncoin_network::{BuildInfo, Daemon, DaemonConfig, Gateway};
use suncoin_rpc::{handle_request, RpcConfig, RpcServer};
use suncoin_store_lmdb::LmdbEnvironment;
use suncoin_utils::Subsystem;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn gateway() -> (tempfile::TempDir, Arc<Gateway>) {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(LmdbEnvironment::open_with_map_size(dir.path(), 16 << 20).unwrap());
    let policy = Arc::new(EmissionPolicy::new(ReservedAddressTable::mainnet().unwrap()));
    let config = DaemonConfig {
        disable_networking: true,
        ..DaemonConfig::default()
    };
    let build = BuildInfo {
        version: "0.21.1".into(),
        commit: "abc123".into(),
    };
    let daemon = Daemon::new(config, db, policy, build).unwrap();
    (dir, daemon.gateway())
}

fn call(gateway: &Gateway, body: Value) -> Value {
    let bytes = serde_json::to_vec(&body).unwrap();
    serde_json::to_value(handle_request(gateway, &bytes)).unwrap()
}

#[test]
fn malformed_body_is_a_parse_error() {
    let (_dir, gw) = gateway();
    let resp = serde_json::to_value(handle_request(&gw, b"{not json")).unwrap();
    assert_eq!(resp["error"]["code"], -32700);
    assert_eq!(resp["id"], Value::Null);
}

#[test]
fn unknown_method_is_reported() {
    let (_dir, gw) = gateway();
    let resp = call(&gw, json!({"jsonrpc": "2.0", "method": "get_blocks", "id": 7}));
    assert_eq!(resp["error"]["code"], -32601);
    assert_eq!(resp["id"], 7);
}

#[test]
fn wrong_version_is_an_invalid_request() {
    let (_dir, gw) = gateway();
    let resp = call(&gw, json!({"jsonrpc": "1.0", "method": "get_status", "id": 1}));
    assert_eq!(resp["error"]["code"], -32600);
}

#[test]
fn get_status_reports_build_info() {
    let (_dir, gw) = gateway();
    let resp = call(&gw, json!({"jsonrpc": "2.0", "method": "get_status", "id": "s"}));
    assert_eq!(resp["result"]["version"], "0.21.1");
    assert_eq!(resp["result"]["networking"], false);
    assert_eq!(resp["result"]["schema_version"], 1);
}

#[test]
fn reserved_addresses_are_split_by_lock_state() {
    let (_dir, gw) = gateway();
    let resp = call(&gw, json!({"jsonrpc": "2.0", "method": "get_reserved_addresses", "id": 1}));
    let unlocked = resp["result"]["unlocked"].as_array().unwrap();
    let locked = resp["result"]["locked"].as_array().unwrap();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(locked.len(), 99);
    assert_eq!(unlocked[0], DISTRIBUTION_ADDRESSES[0]);
    assert_eq!(locked[0], DISTRIBUTION_ADDRESSES[1]);
}

#[test]
fn transaction_lock_check() {
    let (_dir, gw) = gateway();
    let spendable = call(
        &gw,
        json!({"jsonrpc": "2.0", "method": "is_transaction_locked", "id": 1,
               "params": {"addresses": [DISTRIBUTION_ADDRESSES[0]]}}),
    );
    assert_eq!(spendable["result"]["locked"], false);

    let locked = call(
        &gw,
        json!({"jsonrpc": "2.0", "method": "is_transaction_locked", "id": 2,
               "params": {"addresses": [DISTRIBUTION_ADDRESSES[0], DISTRIBUTION_ADDRESSES[99]]}}),
    );
    assert_eq!(locked["result"]["locked"], true);
}

#[test]
fn bad_params_are_rejected() {
    let (_dir, gw) = gateway();
    let missing = call(&gw, json!({"jsonrpc": "2.0", "method": "is_transaction_locked", "id": 1}));
    assert_eq!(missing["error"]["code"], -32602);

    let garbage = call(
        &gw,
        json!({"jsonrpc": "2.0", "method": "is_transaction_locked", "id": 1,
               "params": {"addresses": ["not-an-address"]}}),
    );
    assert_eq!(garbage["error"]["code"], -32602);
}

#[test]
fn zero_workers_is_rejected() {
    let (_dir, gw) = gateway();
    let config = RpcConfig {
        worker_num: 0,
        ..RpcConfig::default()
    };
    assert!(RpcServer::new(config, gw).is_err());
}

async fn post(addr: std::net::SocketAddr, body: &str) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /webrpc HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    raw
}

#[tokio::test]
async fn serves_requests_until_shutdown() {
    let (_dir, gw) = gateway();
    let config = RpcConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        worker_num: 2,
        queue_depth: 4,
    };
    let server = Arc::new(RpcServer::new(config, gw).unwrap());
    let runner = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run().await })
    };

    let mut addr = None;
    for _ in 0..200 {
        addr = server.local_addr();
        if addr.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let addr = addr.expect("rpc server bound");

    let raw = post(addr, r#"{"jsonrpc":"2.0","method":"get_status","id":1}"#).await;
    assert!(raw.starts_with("HTTP/1.1 200"));
    assert!(raw.contains("\"version\":\"0.21.1\""));

    server.shutdown().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("rpc server stops")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn stalled_client_cannot_hold_shutdown_open() {
    let (_dir, gw) = gateway();
    let config = RpcConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        worker_num: 1,
        queue_depth: 1,
    };
    let server = Arc::new(RpcServer::new(config, gw).unwrap());
    let runner = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run().await })
    };

    let mut addr = None;
    for _ in 0..200 {
        addr = server.local_addr();
        if addr.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let addr = addr.expect("rpc server bound");

    // Headers promise 100 bytes, only 4 ever arrive.
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /webrpc HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100\r\n\r\n{\"js")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    server.shutdown().await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(10), runner)
        .await
        .expect("run returns once the grace period is over")
        .unwrap();
    assert!(result.is_ok());
    drop(stream);
}
