//! ABI type descriptors and decoded values

use std::fmt;

use wirecall_primitives::{Address, U256};

/// Named component of a tuple type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component (struct field) name; may be empty for unnamed outputs
    pub name: String,
    /// Component type
    pub kind: ParamType,
}

impl Component {
    /// Create a new component
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Solidity parameter type descriptor.
///
/// Built once when an ABI document is loaded and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address (20 bytes)
    Address,
    /// Unsigned integer with bit width (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit width
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (width 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple with ordered named components
    Tuple(Vec<Component>),
}

impl ParamType {
    /// Check whether this type is dynamic (variable length, encoded via a
    /// head offset into the tail region)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Render the canonical type string used in method signatures:
    /// `uint` -> `uint256`, tuples as `(t1,t2,...)`, arrays appending
    /// `[]` or `[N]`.
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Address => "address".to_string(),
            ParamType::Uint(bits) => format!("uint{}", bits),
            ParamType::Int(bits) => format!("int{}", bits),
            ParamType::Bool => "bool".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::FixedBytes(width) => format!("bytes{}", width),
            ParamType::String => "string".to_string(),
            ParamType::Array(inner) => format!("{}[]", inner.canonical()),
            ParamType::FixedArray(inner, len) => format!("{}[{}]", inner.canonical(), len),
            ParamType::Tuple(components) => {
                let inner: Vec<String> = components.iter().map(|c| c.kind.canonical()).collect();
                format!("({})", inner.join(","))
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Signed 256-bit integer, stored as sign and magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// Sign (true if negative)
    pub negative: bool,
}

impl I256 {
    /// Create a new I256. A zero magnitude is always non-negative.
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        if value < 0 {
            Self {
                abs: U256::from(value.unsigned_abs()),
                negative: true,
            }
        } else {
            Self {
                abs: U256::from(value as u128),
                negative: false,
            }
        }
    }

    /// Check whether the value is zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

/// Decoded ABI value, mirroring [`ParamType`] shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer
    Uint(U256),
    /// Signed integer
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Ordered list (dynamic or fixed array)
    Array(Vec<Value>),
    /// Ordered named list (struct)
    Tuple(Vec<(String, Value)>),
}

impl Value {
    /// Check whether the value's shape matches a descriptor. Aggregates are
    /// checked recursively; fixed lengths must match exactly.
    pub fn matches(&self, kind: &ParamType) -> bool {
        match (self, kind) {
            (Value::Address(_), ParamType::Address) => true,
            (Value::Uint(_), ParamType::Uint(_)) => true,
            (Value::Int(_), ParamType::Int(_)) => true,
            (Value::Bool(_), ParamType::Bool) => true,
            (Value::Bytes(_), ParamType::Bytes) => true,
            (Value::FixedBytes(data), ParamType::FixedBytes(width)) => data.len() == *width,
            (Value::String(_), ParamType::String) => true,
            (Value::Array(items), ParamType::Array(inner)) => {
                items.iter().all(|v| v.matches(inner))
            }
            (Value::Array(items), ParamType::FixedArray(inner, len)) => {
                items.len() == *len && items.iter().all(|v| v.matches(inner))
            }
            (Value::Tuple(fields), ParamType::Tuple(components)) => {
                fields.len() == components.len()
                    && fields
                        .iter()
                        .zip(components.iter())
                        .all(|((_, v), c)| v.matches(&c.kind))
            }
            _ => false,
        }
    }
}
