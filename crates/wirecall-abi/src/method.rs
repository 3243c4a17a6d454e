//! Method descriptors and ABI document loading

use serde::Deserialize;

use wirecall_primitives::keccak256;

use crate::error::AbiError;
use crate::resolver::{resolve_param, RawParam};
use crate::types::{Component, ParamType};

/// Method state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Reads nothing, writes nothing
    Pure,
    /// Reads state, writes nothing
    View,
    /// Writes state, rejects attached value
    Nonpayable,
    /// Writes state, accepts attached value
    Payable,
}

impl Mutability {
    /// READ methods are side-effect free and dispatched as queries
    pub fn is_read(self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }

    /// WRITE methods change state and are dispatched as transactions
    pub fn is_write(self) -> bool {
        !self.is_read()
    }
}

/// A named, typed method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name; may be empty for unnamed outputs
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
}

impl Param {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl From<Component> for Param {
    fn from(c: Component) -> Self {
        Param {
            name: c.name,
            kind: c.kind,
        }
    }
}

/// A contract method descriptor.
///
/// Built once at ABI load time and read-only thereafter; safe to share across
/// any number of concurrent operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Ordered input parameters
    pub inputs: Vec<Param>,
    /// Ordered output parameters
    pub outputs: Vec<Param>,
    /// State mutability
    pub mutability: Mutability,
}

impl Method {
    /// Create a new method descriptor
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        mutability: Mutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            mutability,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`. Parameter names
    /// never appear, so methods differing only in names share a signature.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.kind.canonical()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Method selector: first 4 bytes of the keccak-256 of the canonical
    /// signature
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash.as_bytes()[..4]);
        selector
    }

    /// Whether this method is dispatched as a side-effect-free query
    pub fn is_read(&self) -> bool {
        self.mutability.is_read()
    }

    /// Whether this method is dispatched as a state-changing transaction
    pub fn is_write(&self) -> bool {
        self.mutability.is_write()
    }
}

#[derive(Deserialize)]
struct RawAbiEntry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    // Legacy pre-0.6 ABI flags
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
}

/// Load a contract ABI JSON document into method descriptors.
///
/// Only `function` entries are kept; constructors, events, errors and
/// fallback/receive entries are skipped. Any malformed entry fails the whole
/// load - nothing is partially loaded.
pub fn load_abi(json: &str) -> Result<Vec<Method>, AbiError> {
    let entries: Vec<RawAbiEntry> =
        serde_json::from_str(json).map_err(|e| AbiError::Parse(e.to_string()))?;

    let mut methods = Vec::new();
    for entry in entries {
        if entry.kind.as_deref() != Some("function") {
            continue;
        }
        let name = entry
            .name
            .ok_or_else(|| AbiError::Parse("function entry without a name".to_string()))?;

        let inputs = resolve_params(&entry.inputs)?;
        let outputs = resolve_params(&entry.outputs)?;
        let mutability =
            resolve_mutability(entry.state_mutability.as_deref(), entry.constant, entry.payable)
                .map_err(|msg| AbiError::Parse(format!("function {}: {}", name, msg)))?;

        methods.push(Method::new(name, inputs, outputs, mutability));
    }
    Ok(methods)
}

fn resolve_params(raw: &[RawParam]) -> Result<Vec<Param>, AbiError> {
    raw.iter()
        .map(|p| resolve_param(p).map(Param::from))
        .collect()
}

/// Map the `stateMutability` field, falling back to the legacy
/// `constant`/`payable` flags for pre-0.6 ABIs. An unrecognized mutability
/// string is a load-time failure rather than a silently guessed mode.
fn resolve_mutability(
    state_mutability: Option<&str>,
    constant: Option<bool>,
    payable: Option<bool>,
) -> Result<Mutability, String> {
    match state_mutability {
        Some("pure") => Ok(Mutability::Pure),
        Some("view") => Ok(Mutability::View),
        Some("nonpayable") => Ok(Mutability::Nonpayable),
        Some("payable") => Ok(Mutability::Payable),
        Some(other) => Err(format!("unknown stateMutability: {}", other)),
        None => {
            if constant == Some(true) {
                Ok(Mutability::View)
            } else if payable == Some(true) {
                Ok(Mutability::Payable)
            } else {
                Ok(Mutability::Nonpayable)
            }
        }
    }
}

/// Standard ERC-20 method set, for contracts interacted with by convention
/// rather than a supplied ABI document.
pub fn erc20_methods() -> Vec<Method> {
    let addr = || ParamType::Address;
    let uint = || ParamType::Uint(256);
    vec![
        Method::new(
            "name",
            vec![],
            vec![Param::new("", ParamType::String)],
            Mutability::View,
        ),
        Method::new(
            "symbol",
            vec![],
            vec![Param::new("", ParamType::String)],
            Mutability::View,
        ),
        Method::new(
            "decimals",
            vec![],
            vec![Param::new("", ParamType::Uint(8))],
            Mutability::View,
        ),
        Method::new(
            "totalSupply",
            vec![],
            vec![Param::new("", uint())],
            Mutability::View,
        ),
        Method::new(
            "balanceOf",
            vec![Param::new("owner", addr())],
            vec![Param::new("", uint())],
            Mutability::View,
        ),
        Method::new(
            "allowance",
            vec![Param::new("owner", addr()), Param::new("spender", addr())],
            vec![Param::new("", uint())],
            Mutability::View,
        ),
        Method::new(
            "transfer",
            vec![Param::new("to", addr()), Param::new("amount", uint())],
            vec![Param::new("", ParamType::Bool)],
            Mutability::Nonpayable,
        ),
        Method::new(
            "approve",
            vec![Param::new("spender", addr()), Param::new("amount", uint())],
            vec![Param::new("", ParamType::Bool)],
            Mutability::Nonpayable,
        ),
        Method::new(
            "transferFrom",
            vec![
                Param::new("from", addr()),
                Param::new("to", addr()),
                Param::new("amount", uint()),
            ],
            vec![Param::new("", ParamType::Bool)],
            Mutability::Nonpayable,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ABI: &str = r#"[
        {
            "type": "function",
            "name": "balanceOf",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "inputs": []
        }
    ]"#;

    #[test]
    fn test_load_abi_keeps_functions_only() {
        let methods = load_abi(SAMPLE_ABI).unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name, "balanceOf");
        assert!(methods[0].is_read());
        assert_eq!(methods[1].name, "transfer");
        assert!(methods[1].is_write());
    }

    #[test]
    fn test_selector_known_vectors() {
        let methods = load_abi(SAMPLE_ABI).unwrap();
        assert_eq!(methods[0].selector(), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(methods[1].selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_selector_ignores_parameter_names() {
        let a = Method::new(
            "transfer",
            vec![
                Param::new("to", ParamType::Address),
                Param::new("amount", ParamType::Uint(256)),
            ],
            vec![],
            Mutability::Nonpayable,
        );
        let b = Method::new(
            "transfer",
            vec![
                Param::new("recipient", ParamType::Address),
                Param::new("wad", ParamType::Uint(256)),
            ],
            vec![],
            Mutability::Nonpayable,
        );
        assert_eq!(a.selector(), b.selector());
    }

    #[test]
    fn test_signature_canonicalizes_tuples() {
        let method = Method::new(
            "submit",
            vec![Param::new(
                "order",
                ParamType::Tuple(vec![
                    Component::new("price", ParamType::Uint(256)),
                    Component::new("maker", ParamType::Address),
                ]),
            )],
            vec![],
            Mutability::Nonpayable,
        );
        assert_eq!(method.signature(), "submit((uint256,address))");
    }

    #[test]
    fn test_load_abi_rejects_unknown_mutability() {
        let json = r#"[{
            "type": "function",
            "name": "f",
            "inputs": [],
            "outputs": [],
            "stateMutability": "mystery"
        }]"#;
        assert!(matches!(load_abi(json), Err(AbiError::Parse(_))));
    }

    #[test]
    fn test_load_abi_legacy_flags() {
        let json = r#"[
            {"type": "function", "name": "ro", "inputs": [], "outputs": [], "constant": true},
            {"type": "function", "name": "pay", "inputs": [], "outputs": [], "payable": true},
            {"type": "function", "name": "wr", "inputs": [], "outputs": []}
        ]"#;
        let methods = load_abi(json).unwrap();
        assert_eq!(methods[0].mutability, Mutability::View);
        assert_eq!(methods[1].mutability, Mutability::Payable);
        assert_eq!(methods[2].mutability, Mutability::Nonpayable);
    }

    #[test]
    fn test_load_abi_tuple_components() {
        let json = r#"[{
            "type": "function",
            "name": "getOrder",
            "inputs": [],
            "outputs": [{
                "name": "order",
                "type": "tuple",
                "components": [
                    {"name": "price", "type": "uint256"},
                    {"name": "active", "type": "bool"}
                ]
            }],
            "stateMutability": "view"
        }]"#;
        let methods = load_abi(json).unwrap();
        assert_eq!(
            methods[0].outputs[0].kind.canonical(),
            "(uint256,bool)"
        );
    }

    #[test]
    fn test_load_abi_malformed_json_fails_whole_load() {
        assert!(load_abi("not json").is_err());
        assert!(load_abi(r#"[{"type": "function", "name": "f", "inputs": [{"name": "x", "type": "uint7"}]}]"#).is_err());
    }

    #[test]
    fn test_erc20_preset() {
        let methods = erc20_methods();
        let transfer = methods.iter().find(|m| m.name == "transfer").unwrap();
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert!(methods.iter().find(|m| m.name == "balanceOf").unwrap().is_read());
    }
}
