//! HttpTransport against a minimal in-process JSON-RPC node.
//!
//! The fake node answers one scripted response per connection and records
//! every request body it receives.

use multicall_abi::ChecksumAddress;
use multicall_transport::{
    BlockId, CallParameters, HttpTransport, HttpTransportConfig, Transport, TransportError,
};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

const CHAI: &str = "0x06AF07097C9Eeb7fD685c692751D5C66dB49c215";

// ============================================================================
// Test Helpers
// ============================================================================

struct FakeNode {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeNode {
    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

fn spawn_node(responses: Vec<(u16, Value)>) -> FakeNode {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    thread::spawn(move || {
        for (status, body) in responses {
            let (stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut reader = BufReader::new(stream);

            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    break;
                }
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }

            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();
            if let Ok(value) = serde_json::from_slice::<Value>(&request_body) {
                recorded.lock().unwrap().push(value);
            }

            let payload = body.to_string();
            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                payload.len(),
                payload
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    FakeNode { addr, requests }
}

fn local_transport(url: &str) -> HttpTransport {
    HttpTransport::new(HttpTransportConfig::new(url).without_proxy()).unwrap()
}

fn params() -> CallParameters {
    let mut params = CallParameters::new(
        ChecksumAddress::parse(CHAI).unwrap(),
        vec![0x06, 0xfd, 0xde, 0x03],
    );
    params.block_id = Some(BlockId::Number(17));
    params
}

// ============================================================================
// Blocking path
// ============================================================================

#[test]
fn test_sync_eth_call_returns_bytes() {
    let node = spawn_node(vec![(200, json!({"jsonrpc":"2.0","id":1,"result":"0xdeadbeef"}))]);
    let transport = local_transport(&node.url());

    let output = transport.call(&params()).unwrap();
    assert_eq!(output, vec![0xde, 0xad, 0xbe, 0xef]);

    let requests = node.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["method"], "eth_call");
    assert_eq!(
        requests[0]["params"],
        json!([{ "to": CHAI, "data": "0x06fdde03" }, "0x11"])
    );
}

#[test]
fn test_sync_chain_id_is_cached() {
    let node = spawn_node(vec![(200, json!({"jsonrpc":"2.0","id":1,"result":"0x64"}))]);
    let transport = local_transport(&node.url());

    assert_eq!(transport.chain_id().unwrap(), 100);
    // The node only answers once; a second request would fail
    assert_eq!(transport.chain_id().unwrap(), 100);
    assert_eq!(node.requests().len(), 1);
}

#[test]
fn test_sync_connection_refused_is_transient() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let transport = local_transport(&format!("http://{}", addr));

    let err = transport.call(&params()).unwrap_err();
    assert!(err.is_transient(), "{err:?}");
}

// ============================================================================
// Async path
// ============================================================================

#[tokio::test]
async fn test_async_eth_call_returns_bytes() {
    let node = spawn_node(vec![(200, json!({"jsonrpc":"2.0","id":1,"result":"0x01"}))]);
    let transport = local_transport(&node.url());

    assert_eq!(transport.call_async(&params()).await.unwrap(), vec![0x01]);
}

#[tokio::test]
async fn test_async_rate_limit_status_is_transient() {
    let node = spawn_node(vec![(429, json!({"message":"slow down"}))]);
    let transport = local_transport(&node.url());

    let err = transport.call_async(&params()).await.unwrap_err();
    assert!(matches!(err, TransportError::Transient(_)), "{err:?}");
}

#[tokio::test]
async fn test_async_revert_is_permanent() {
    let node = spawn_node(vec![(
        200,
        json!({"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted"}}),
    )]);
    let transport = local_transport(&node.url());

    let err = transport.call_async(&params()).await.unwrap_err();
    assert!(matches!(err, TransportError::Permanent(_)), "{err:?}");
}

#[tokio::test]
async fn test_async_chain_id() {
    let node = spawn_node(vec![(200, json!({"jsonrpc":"2.0","id":1,"result":"0x1"}))]);
    let transport = local_transport(&node.url());

    assert_eq!(transport.chain_id_async().await.unwrap(), 1);
    assert_eq!(transport.chain_id_async().await.unwrap(), 1);
}
