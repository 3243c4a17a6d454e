//! ABI call encoding
//!
//! Encodes typed values into the 32-byte-word head/tail scheme. Static types
//! are written inline in the head; dynamic types leave a head offset and
//! append length-prefixed content to the tail, with offsets measured from the
//! start of the enclosing encoded block. The same rule recurses at every
//! nesting level.

use wirecall_primitives::{keccak256, U256};

use crate::error::AbiError;
use crate::method::Method;
use crate::types::{ParamType, Value};

/// An encoded call payload: selector plus head/tail body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    /// 4-byte method selector
    pub selector: [u8; 4],
    /// Encoded arguments (head ++ tail)
    pub body: Vec<u8>,
}

impl EncodedCall {
    /// Flatten into the wire payload `selector ++ body`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.body.len());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(&self.body);
        out
    }
}

/// Compute a method selector from a canonical signature string
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Encode a full call for a method and its coerced arguments
pub fn encode_call(method: &Method, args: &[Value]) -> Result<EncodedCall, AbiError> {
    let types: Vec<ParamType> = method.inputs.iter().map(|p| p.kind.clone()).collect();
    Ok(EncodedCall {
        selector: method.selector(),
        body: encode_params(&types, args)?,
    })
}

/// Encode a parameter list into a head/tail block
pub fn encode_params(types: &[ParamType], values: &[Value]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::Encode(format!(
            "expected {} values, got {}",
            types.len(),
            values.len()
        )));
    }
    let items: Vec<(&ParamType, &Value)> = types.iter().zip(values.iter()).collect();
    encode_block(&items)
}

/// The general recursive rule: one head/tail block for an ordered sequence of
/// typed values. Every aggregate (top-level parameter list, tuple content,
/// array content) is such a block.
fn encode_block(items: &[(&ParamType, &Value)]) -> Result<Vec<u8>, AbiError> {
    let head_size: usize = items.iter().map(|(t, _)| head_length(t)).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (kind, value) in items {
        if kind.is_dynamic() {
            head.extend(encode_u256(U256::from(head_size + tail.len())));
            tail.extend(encode_token(kind, value)?);
        } else {
            head.extend(encode_token(kind, value)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Head size in bytes for a type: 32 for every dynamic type (the offset word)
/// and for every static scalar; static aggregates flatten their members.
fn head_length(kind: &ParamType) -> usize {
    if kind.is_dynamic() {
        return 32;
    }
    match kind {
        ParamType::FixedArray(inner, len) => head_length(inner) * len,
        ParamType::Tuple(components) => components.iter().map(|c| head_length(&c.kind)).sum(),
        _ => 32,
    }
}

fn encode_token(kind: &ParamType, value: &Value) -> Result<Vec<u8>, AbiError> {
    match (kind, value) {
        (ParamType::Address, Value::Address(addr)) => {
            let mut word = [0u8; 32];
            word[12..32].copy_from_slice(addr.as_bytes());
            Ok(word.to_vec())
        }
        (ParamType::Uint(_), Value::Uint(v)) => Ok(encode_u256(*v)),
        (ParamType::Int(_), Value::Int(v)) => {
            if v.negative {
                Ok(twos_complement(v.abs).to_vec())
            } else {
                Ok(encode_u256(v.abs))
            }
        }
        (ParamType::Bool, Value::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            Ok(word.to_vec())
        }
        (ParamType::FixedBytes(width), Value::FixedBytes(data)) => {
            if data.len() != *width {
                return Err(AbiError::Encode(format!(
                    "fixed bytes value has {} bytes, descriptor says {}",
                    data.len(),
                    width
                )));
            }
            let mut word = [0u8; 32];
            word[..data.len()].copy_from_slice(data);
            Ok(word.to_vec())
        }
        (ParamType::Bytes, Value::Bytes(data)) => Ok(encode_length_prefixed(data)),
        (ParamType::String, Value::String(s)) => Ok(encode_length_prefixed(s.as_bytes())),
        (ParamType::Array(inner), Value::Array(items)) => {
            let mut out = encode_u256(U256::from(items.len()));
            let pairs: Vec<(&ParamType, &Value)> =
                items.iter().map(|v| (inner.as_ref(), v)).collect();
            out.extend(encode_block(&pairs)?);
            Ok(out)
        }
        (ParamType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(AbiError::Encode(format!(
                    "fixed array value has {} elements, descriptor says {}",
                    items.len(),
                    len
                )));
            }
            let pairs: Vec<(&ParamType, &Value)> =
                items.iter().map(|v| (inner.as_ref(), v)).collect();
            encode_block(&pairs)
        }
        (ParamType::Tuple(components), Value::Tuple(fields)) => {
            if fields.len() != components.len() {
                return Err(AbiError::Encode(format!(
                    "tuple value has {} fields, descriptor says {}",
                    fields.len(),
                    components.len()
                )));
            }
            let pairs: Vec<(&ParamType, &Value)> = components
                .iter()
                .zip(fields.iter())
                .map(|(c, (_, v))| (&c.kind, v))
                .collect();
            encode_block(&pairs)
        }
        (kind, value) => Err(AbiError::Encode(format!(
            "value {:?} does not match type {}",
            value,
            kind.canonical()
        ))),
    }
}

fn u256_to_bytes(value: U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

fn encode_u256(value: U256) -> Vec<u8> {
    u256_to_bytes(value).to_vec()
}

/// Two's complement of a magnitude over 256 bits (sign-extends any intN)
fn twos_complement(abs: U256) -> [u8; 32] {
    let bytes = u256_to_bytes(abs);
    let mut out = [0u8; 32];
    for (o, b) in out.iter_mut().zip(bytes.iter()) {
        *o = !b;
    }
    let mut carry = 1u16;
    for b in out.iter_mut().rev() {
        let sum = u16::from(*b) + carry;
        *b = sum as u8;
        carry = sum >> 8;
    }
    out
}

/// Length word followed by the payload padded up to a 32-byte boundary
fn encode_length_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = encode_u256(U256::from(data.len()));
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    out.extend(padded);
    out
}
