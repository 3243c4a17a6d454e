//! Transport capability and implementations
//!
//! The engine talks to a node through the object-safe [`Transport`] trait.
//! [`HttpTransport`] speaks JSON-RPC over HTTP; [`MockTransport`] is a
//! scriptable in-memory implementation for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use wirecall_primitives::H256;

use crate::types::CallRequest;

/// Transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection or protocol failure before a response was obtained
    #[error("network error: {0}")]
    Network(String),
    /// The node answered with an RPC error
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Node-supplied error message
        message: String,
    },
}

/// Node communication capability (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a read-only call and return the raw result bytes
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, TransportError>;

    /// Ask the node to estimate gas for the request
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, TransportError>;

    /// Current gas price in wei
    async fn gas_price(&self) -> Result<u128, TransportError>;

    /// Submit a transaction and return its hash
    async fn send_transaction(&self, request: &CallRequest) -> Result<H256, TransportError>;
}

/// HTTP JSON-RPC transport
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL with a 30 second
    /// request timeout
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(url, Duration::from_secs(30))
    }

    /// Create a transport with an explicit request timeout
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn request_json(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or_else(|| TransportError::Rpc {
            code: -32603,
            message: "no result in response".to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, TransportError> {
        let params = vec![
            to_json(request)?,
            serde_json::Value::String("latest".to_string()),
        ];
        let result = self.request_json("eth_call", params).await?;
        parse_data(&result)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, TransportError> {
        let result = self
            .request_json("eth_estimateGas", vec![to_json(request)?])
            .await?;
        let quantity = parse_quantity(&result)?;
        u64::try_from(quantity)
            .map_err(|_| TransportError::Network(format!("gas estimate out of range: {}", quantity)))
    }

    async fn gas_price(&self) -> Result<u128, TransportError> {
        let result = self.request_json("eth_gasPrice", vec![]).await?;
        parse_quantity(&result)
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<H256, TransportError> {
        let result = self
            .request_json("eth_sendTransaction", vec![to_json(request)?])
            .await?;
        parse_hash(&result)
    }
}

fn to_json(request: &CallRequest) -> Result<serde_json::Value, TransportError> {
    serde_json::to_value(request).map_err(|e| TransportError::Network(e.to_string()))
}

/// Parse a JSON-RPC hex quantity ("0x5208")
fn parse_quantity(value: &serde_json::Value) -> Result<u128, TransportError> {
    let s = expect_string(value)?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|_| TransportError::Network(format!("invalid hex quantity: {}", s)))
}

/// Parse JSON-RPC hex data ("0x" means empty)
fn parse_data(value: &serde_json::Value) -> Result<Vec<u8>, TransportError> {
    let s = expect_string(value)?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| TransportError::Network(format!("invalid hex data: {}", e)))
}

fn parse_hash(value: &serde_json::Value) -> Result<H256, TransportError> {
    let s = expect_string(value)?;
    H256::from_hex(s).map_err(|e| TransportError::Network(format!("invalid tx hash: {}", e)))
}

fn expect_string(value: &serde_json::Value) -> Result<&str, TransportError> {
    value
        .as_str()
        .ok_or_else(|| TransportError::Network(format!("expected string result, got {}", value)))
}

#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Scriptable transport for tests.
///
/// Gas estimation outcomes are scripted as a queue; each `estimate_gas` call
/// pops one. An empty queue yields the default estimate, or the configured
/// default error when one is set. Calls are counted so tests can assert how
/// many polling attempts and submissions happened.
pub struct MockTransport {
    estimates: Mutex<VecDeque<Result<u64, TransportError>>>,
    estimate_error: Mutex<Option<String>>,
    call_result: Mutex<Vec<u8>>,
    gas_price: Mutex<u128>,
    tx_hash: H256,
    estimate_count: AtomicUsize,
    send_count: AtomicUsize,
}

impl MockTransport {
    /// Create a mock with a 1 gwei gas price, a 21000 default estimate and an
    /// empty call result
    pub fn new() -> Self {
        Self {
            estimates: Mutex::new(VecDeque::new()),
            estimate_error: Mutex::new(None),
            call_result: Mutex::new(Vec::new()),
            gas_price: Mutex::new(1_000_000_000),
            tx_hash: H256::from_bytes([0x42; 32]),
            estimate_count: AtomicUsize::new(0),
            send_count: AtomicUsize::new(0),
        }
    }

    /// Queue a gas estimation outcome
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn push_estimate(&self, outcome: Result<u64, TransportError>) {
        self.estimates
            .lock()
            .expect("MockTransport mutex poisoned")
            .push_back(outcome);
    }

    /// Make every unscripted estimate fail with this message
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_estimate_error(&self, message: &str) {
        *self
            .estimate_error
            .lock()
            .expect("MockTransport mutex poisoned") = Some(message.to_string());
    }

    /// Set the raw bytes returned by `call`
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_call_result(&self, data: Vec<u8>) {
        *self
            .call_result
            .lock()
            .expect("MockTransport mutex poisoned") = data;
    }

    /// Set the gas price in wei
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn set_gas_price(&self, wei: u128) {
        *self.gas_price.lock().expect("MockTransport mutex poisoned") = wei;
    }

    /// The transaction hash `send_transaction` returns
    pub fn tx_hash(&self) -> H256 {
        self.tx_hash
    }

    /// Number of `estimate_gas` calls made so far
    pub fn estimate_count(&self) -> usize {
        self.estimate_count.load(Ordering::SeqCst)
    }

    /// Number of `send_transaction` calls made so far
    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, _request: &CallRequest) -> Result<Vec<u8>, TransportError> {
        Ok(self
            .call_result
            .lock()
            .map_err(|_| TransportError::Network("MockTransport mutex poisoned".to_string()))?
            .clone())
    }

    async fn estimate_gas(&self, _request: &CallRequest) -> Result<u64, TransportError> {
        self.estimate_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .estimates
            .lock()
            .map_err(|_| TransportError::Network("MockTransport mutex poisoned".to_string()))?
            .pop_front();
        if let Some(outcome) = scripted {
            return outcome;
        }
        let default_error = self
            .estimate_error
            .lock()
            .map_err(|_| TransportError::Network("MockTransport mutex poisoned".to_string()))?
            .clone();
        match default_error {
            Some(message) => Err(TransportError::Rpc {
                code: 3,
                message,
            }),
            None => Ok(21000),
        }
    }

    async fn gas_price(&self) -> Result<u128, TransportError> {
        Ok(*self
            .gas_price
            .lock()
            .map_err(|_| TransportError::Network("MockTransport mutex poisoned".to_string()))?)
    }

    async fn send_transaction(&self, _request: &CallRequest) -> Result<H256, TransportError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_estimate() {
        let transport = MockTransport::new();
        assert_eq!(
            transport.estimate_gas(&CallRequest::default()).await.unwrap(),
            21000
        );
        assert_eq!(transport.estimate_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_estimates() {
        let transport = MockTransport::new();
        transport.push_estimate(Err(TransportError::Rpc {
            code: 3,
            message: "execution reverted".to_string(),
        }));
        transport.push_estimate(Ok(50000));

        assert!(transport.estimate_gas(&CallRequest::default()).await.is_err());
        assert_eq!(
            transport.estimate_gas(&CallRequest::default()).await.unwrap(),
            50000
        );
        assert_eq!(transport.estimate_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_estimate_error_default() {
        let transport = MockTransport::new();
        transport.set_estimate_error("execution reverted: not open");
        let err = transport
            .estimate_gas(&CallRequest::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not open"));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&serde_json::json!("0x5208")).unwrap(), 21000);
        assert_eq!(parse_quantity(&serde_json::json!("0x")).unwrap(), 0);
        assert!(parse_quantity(&serde_json::json!("0xzz")).is_err());
        assert!(parse_quantity(&serde_json::json!(42)).is_err());
    }

    #[test]
    fn test_parse_data_empty() {
        assert_eq!(parse_data(&serde_json::json!("0x")).unwrap(), Vec::<u8>::new());
        assert_eq!(
            parse_data(&serde_json::json!("0xdead")).unwrap(),
            vec![0xde, 0xad]
        );
    }
}
