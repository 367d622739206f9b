//! JSON-RPC 2.0 over HTTP.
//!
//! One `HttpTransport` serves both execution paths: an async `reqwest::Client`
//! and a lazily-built blocking client that share request ids and the cached
//! chain id.

use crate::error::TransportError;
use crate::transport::Transport;
use crate::types::CallParameters;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    method: String,
    params: Value,
    id: u64,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RpcResponse {
    #[serde(default)]
    jsonrpc: String,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcError>,
    #[serde(default)]
    id: Value,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, TransportError> {
        if let Some(error) = self.error {
            let message = match &error.data {
                Some(Value::String(data)) => format!("{} ({})", error.message, data),
                _ => error.message.clone(),
            };
            return Err(TransportError::from_rpc_error(error.code, &message));
        }
        Ok(self.result)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub url: String,
    pub request_timeout: Duration,
    /// Honor HTTP(S)_PROXY from the environment
    pub system_proxy: bool,
}

impl HttpTransportConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            request_timeout: Duration::from_secs(30),
            system_proxy: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn without_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }
}

/// JSON-RPC transport over HTTP POST
pub struct HttpTransport {
    url: String,
    timeout: Duration,
    system_proxy: bool,
    client: reqwest::Client,
    blocking: OnceCell<reqwest::blocking::Client>,
    request_id: AtomicU64,
    chain_id: OnceCell<u64>,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let url = config.url.trim().to_string();
        if url.is_empty() {
            return Err(TransportError::Permanent("rpc url is not configured".to_string()));
        }

        let mut builder = reqwest::Client::builder().timeout(config.request_timeout);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Permanent(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            url,
            timeout: config.request_timeout,
            system_proxy: config.system_proxy,
            client,
            blocking: OnceCell::new(),
            request_id: AtomicU64::new(1),
            chain_id: OnceCell::new(),
        })
    }

    /// Shortcut for a transport with the default timeout
    pub fn connect(url: &str) -> Result<Self, TransportError> {
        Self::new(HttpTransportConfig::new(url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_request(&self, method: &str, params: Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0",
            method: method.to_string(),
            params,
            id: self.request_id.fetch_add(1, Ordering::SeqCst),
        }
    }

    // Built on first use so that constructing an HttpTransport inside an
    // async context never spins up the blocking client's internal runtime.
    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, TransportError> {
        self.blocking.get_or_try_init(|| {
            let mut builder = reqwest::blocking::Client::builder().timeout(self.timeout);
            if !self.system_proxy {
                builder = builder.no_proxy();
            }
            builder
                .build()
                .map_err(|e| {
                    TransportError::Permanent(format!("failed to build http client: {}", e))
                })
        })
    }

    /// Make a blocking RPC request
    pub fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let request = self.next_request(method, params);
        trace!(method = %request.method, id = request.id, "rpc request");

        let response = self
            .blocking_client()?
            .post(&self.url)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::from_http_status(status.as_u16(), &body));
        }

        let rpc_response: RpcResponse = response
            .json()
            .map_err(|e| TransportError::Permanent(format!("invalid JSON-RPC response: {}", e)))?;

        rpc_response.into_result()
    }

    /// Make an async RPC request
    pub async fn request_async(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let request = self.next_request(method, params);
        trace!(method = %request.method, id = request.id, "rpc request");

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::from_http_status(status.as_u16(), &body));
        }

        let rpc_response: RpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Permanent(format!("invalid JSON-RPC response: {}", e)))?;

        rpc_response.into_result()
    }

    fn cache_chain_id(&self, chain_id: u64) -> u64 {
        let cached = *self.chain_id.get_or_init(|| chain_id);
        debug!(url = %self.url, chain_id = cached, "resolved chain id");
        cached
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn call(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError> {
        let result = self.request("eth_call", params.to_rpc_params())?;
        parse_hex_data(&result)
    }

    async fn call_async(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError> {
        let result = self
            .request_async("eth_call", params.to_rpc_params())
            .await?;
        parse_hex_data(&result)
    }

    fn chain_id(&self) -> Result<u64, TransportError> {
        if let Some(chain_id) = self.chain_id.get() {
            return Ok(*chain_id);
        }
        let result = self.request("eth_chainId", json!([]))?;
        Ok(self.cache_chain_id(parse_hex_quantity(&result)?))
    }

    async fn chain_id_async(&self) -> Result<u64, TransportError> {
        if let Some(chain_id) = self.chain_id.get() {
            return Ok(*chain_id);
        }
        let result = self.request_async("eth_chainId", json!([])).await?;
        Ok(self.cache_chain_id(parse_hex_quantity(&result)?))
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }
}

/// Parse a `0x`-prefixed data string into bytes
pub fn parse_hex_data(value: &Value) -> Result<Vec<u8>, TransportError> {
    let data = value
        .as_str()
        .ok_or_else(|| TransportError::Permanent(format!("expected hex data, got {}", value)))?;

    let stripped = data.trim_start_matches("0x");
    hex::decode(stripped)
        .map_err(|e| TransportError::Permanent(format!("failed to parse hex data: {}", e)))
}

/// Parse a `0x`-prefixed quantity into a u64
pub fn parse_hex_quantity(value: &Value) -> Result<u64, TransportError> {
    let quantity = value
        .as_str()
        .ok_or_else(|| TransportError::Permanent(format!("expected hex quantity, got {}", value)))?;

    u64::from_str_radix(quantity.trim_start_matches("0x"), 16)
        .map_err(|e| TransportError::Permanent(format!("failed to parse quantity: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_data() {
        assert_eq!(parse_hex_data(&json!("0x")).unwrap(), Vec::<u8>::new());
        assert_eq!(parse_hex_data(&json!("0x0a0b")).unwrap(), vec![0x0a, 0x0b]);
        assert!(parse_hex_data(&json!("0xzz")).is_err());
        assert!(parse_hex_data(&json!(12)).is_err());
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity(&json!("0x1")).unwrap(), 1);
        assert_eq!(parse_hex_quantity(&json!("0x64")).unwrap(), 100);
        assert!(parse_hex_quantity(&json!(null)).is_err());
    }

    #[test]
    fn test_rpc_error_is_classified() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32005, "message": "daily request count exceeded" }
        }))
        .unwrap();
        assert!(response.into_result().unwrap_err().is_transient());

        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 3, "message": "execution reverted", "data": "0x08c379a0" }
        }))
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert!(!err.is_transient());
        assert!(err.message().contains("execution reverted (0x08c379a0)"));
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert!(HttpTransport::connect("  ").is_err());
    }

    #[test]
    fn test_request_ids_increase() {
        let transport = HttpTransport::connect("http://localhost:8545").unwrap();
        let first = transport.next_request("eth_chainId", json!([]));
        let second = transport.next_request("eth_chainId", json!([]));
        assert_eq!(second.id, first.id + 1);
    }
}
