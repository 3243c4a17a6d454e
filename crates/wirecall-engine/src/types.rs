//! Engine request and outcome types

use bytes::Bytes;
use serde::Serialize;

use wirecall_abi::types::Value;
use wirecall_primitives::{Address, H256, U256};

/// Call request sent to the node for queries, gas estimation and
/// transaction submission
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Contract address
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price in wei
    pub gas_price: Option<u128>,
    /// Attached value in wei
    pub value: Option<U256>,
    /// Encoded call data
    pub data: Option<Bytes>,
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut count = 0;
        if self.from.is_some() {
            count += 1;
        }
        if self.to.is_some() {
            count += 1;
        }
        if self.gas.is_some() {
            count += 1;
        }
        if self.gas_price.is_some() {
            count += 1;
        }
        if self.value.is_some() {
            count += 1;
        }
        if self.data.is_some() {
            count += 1;
        }

        let mut map = serializer.serialize_map(Some(count))?;
        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &format!("0x{:x}", gas_price))?;
        }
        if let Some(value) = &self.value {
            let mut bytes = [0u8; 32];
            value.to_big_endian(&mut bytes);
            let hex = format!("0x{}", hex::encode(bytes).trim_start_matches('0'));
            let hex = if hex == "0x" { "0x0".to_string() } else { hex };
            map.serialize_entry("value", &hex)?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }
        map.end()
    }
}

/// A single user-initiated execution: method, raw arguments and optional
/// overrides. Created fresh per action and consumed once.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Method name
    pub method: String,
    /// Raw string arguments, one per input parameter
    pub args: Vec<String>,
    /// Value in wei to attach (payable methods)
    pub value: Option<U256>,
    /// Gas limit override; skips estimation when set
    pub gas_limit: Option<u64>,
    /// Gas price override in wei; skips the price lookup when set
    pub gas_price_wei: Option<u128>,
}

impl ExecutionRequest {
    /// Create a request with no value attached and no overrides
    pub fn new(method: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            method: method.into(),
            args,
            value: None,
            gas_limit: None,
            gas_price_wei: None,
        }
    }

    /// Attach a value in wei
    pub fn with_value(mut self, wei: U256) -> Self {
        self.value = Some(wei);
        self
    }

    /// Override the gas limit
    pub fn with_gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = Some(gas);
        self
    }

    /// Override the gas price in wei
    pub fn with_gas_price(mut self, wei: u128) -> Self {
        self.gas_price_wei = Some(wei);
        self
    }
}

/// A gas estimate with the safety margin already applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    /// Gas limit to submit with: the node's estimate plus a 20% margin
    pub gas_limit: u64,
    /// Current gas price in wei
    pub gas_price_wei: u128,
    /// Current gas price in gwei, rounded down
    pub gas_price_gwei: u128,
}

/// Result of executing a contract method
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// A read method's decoded and formatted return values
    Read {
        /// Human-readable rendering of the return values
        formatted: String,
        /// The decoded values themselves
        values: Vec<Value>,
    },
    /// A write method's submitted transaction
    Write {
        /// Transaction hash returned by the node
        tx_hash: H256,
        /// The estimate the transaction was submitted with
        gas: GasEstimate,
    },
}
