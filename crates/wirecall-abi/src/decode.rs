//! ABI result decoding
//!
//! Inverts the encoder by walking the same head/tail rule: static types read
//! inline, dynamic types read a head offset into their enclosing block and
//! continue there. Offsets are bounds- and alignment-checked; a zero-length
//! buffer for a method with declared outputs is the distinct
//! [`AbiError::EmptyResult`] outcome.

use wirecall_primitives::{Address, U256};

use crate::error::AbiError;
use crate::method::Param;
use crate::types::{I256, ParamType, Value};

/// Decode a method's return data against its output descriptors
pub fn decode_output(outputs: &[Param], data: &[u8]) -> Result<Vec<Value>, AbiError> {
    if data.is_empty() && !outputs.is_empty() {
        return Err(AbiError::EmptyResult);
    }
    let types: Vec<ParamType> = outputs.iter().map(|p| p.kind.clone()).collect();
    decode_params(&types, data)
}

/// Decode a head/tail block against a parameter type list
pub fn decode_params(types: &[ParamType], data: &[u8]) -> Result<Vec<Value>, AbiError> {
    let mut offset = 0;
    let mut values = Vec::with_capacity(types.len());
    for kind in types {
        let (value, consumed) = decode_token(kind, data, offset)?;
        values.push(value);
        offset += consumed;
    }
    Ok(values)
}

/// Decode one value whose head slot sits at `offset` within `block`.
/// Returns the value and the number of head bytes consumed.
fn decode_token(kind: &ParamType, block: &[u8], offset: usize) -> Result<(Value, usize), AbiError> {
    if kind.is_dynamic() {
        let content = read_offset(block, offset)?;
        let value = match kind {
            ParamType::Bytes => Value::Bytes(decode_length_prefixed(block, content)?),
            ParamType::String => {
                let bytes = decode_length_prefixed(block, content)?;
                let s = String::from_utf8(bytes)
                    .map_err(|e| AbiError::Decode(format!("invalid UTF-8 string: {}", e)))?;
                Value::String(s)
            }
            ParamType::Array(inner) => {
                let len = read_length(block, content)?;
                let elements = sub_block(block, content + 32)?;
                Value::Array(decode_sequence(inner, len, elements)?)
            }
            ParamType::FixedArray(inner, len) => {
                let elements = sub_block(block, content)?;
                Value::Array(decode_sequence(inner, *len, elements)?)
            }
            ParamType::Tuple(components) => {
                let fields = sub_block(block, content)?;
                decode_tuple(components, fields)?
            }
            // is_dynamic() is false for every other variant
            _ => unreachable!("static type reached dynamic branch"),
        };
        return Ok((value, 32));
    }

    match kind {
        ParamType::Address => {
            let word = read_word(block, offset)?;
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..32]);
            Ok((Value::Address(Address::from_bytes(bytes)), 32))
        }
        ParamType::Uint(_) => {
            let word = read_word(block, offset)?;
            Ok((Value::Uint(U256::from_big_endian(word)), 32))
        }
        ParamType::Int(_) => {
            let word = read_word(block, offset)?;
            let negative = word[0] & 0x80 != 0;
            let abs = if negative {
                // Undo two's complement: flip and add one
                let mut flipped = [0u8; 32];
                for (f, b) in flipped.iter_mut().zip(word.iter()) {
                    *f = !b;
                }
                let mut carry = 1u16;
                for b in flipped.iter_mut().rev() {
                    let sum = u16::from(*b) + carry;
                    *b = sum as u8;
                    carry = sum >> 8;
                }
                U256::from_big_endian(&flipped)
            } else {
                U256::from_big_endian(word)
            };
            Ok((Value::Int(I256::new(abs, negative)), 32))
        }
        ParamType::Bool => {
            let word = read_word(block, offset)?;
            Ok((Value::Bool(word[31] != 0), 32))
        }
        ParamType::FixedBytes(width) => {
            let word = read_word(block, offset)?;
            Ok((Value::FixedBytes(word[..*width].to_vec()), 32))
        }
        ParamType::FixedArray(inner, len) => {
            let mut inner_offset = offset;
            let mut values = Vec::with_capacity(*len);
            for _ in 0..*len {
                let (value, consumed) = decode_token(inner, block, inner_offset)?;
                values.push(value);
                inner_offset += consumed;
            }
            Ok((Value::Array(values), inner_offset - offset))
        }
        ParamType::Tuple(components) => {
            let mut inner_offset = offset;
            let mut fields = Vec::with_capacity(components.len());
            for component in components {
                let (value, consumed) = decode_token(&component.kind, block, inner_offset)?;
                fields.push((component.name.clone(), value));
                inner_offset += consumed;
            }
            Ok((Value::Tuple(fields), inner_offset - offset))
        }
        // Dynamic variants are handled above
        _ => unreachable!("dynamic type reached static branch"),
    }
}

/// Decode `len` consecutive values of one type from the start of a block
fn decode_sequence(kind: &ParamType, len: usize, block: &[u8]) -> Result<Vec<Value>, AbiError> {
    let mut offset = 0;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        let (value, consumed) = decode_token(kind, block, offset)?;
        values.push(value);
        offset += consumed;
    }
    Ok(values)
}

/// Decode a tuple's components from the start of its content block
fn decode_tuple(
    components: &[crate::types::Component],
    block: &[u8],
) -> Result<Value, AbiError> {
    let mut offset = 0;
    let mut fields = Vec::with_capacity(components.len());
    for component in components {
        let (value, consumed) = decode_token(&component.kind, block, offset)?;
        fields.push((component.name.clone(), value));
        offset += consumed;
    }
    Ok(Value::Tuple(fields))
}

fn read_word(block: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset
        .checked_add(32)
        .ok_or_else(|| AbiError::Decode("offset overflow".to_string()))?;
    if block.len() < end {
        return Err(AbiError::Decode(format!(
            "buffer too short: need {} bytes, have {}",
            end,
            block.len()
        )));
    }
    Ok(&block[offset..end])
}

/// Read a dynamic value's tail offset and validate it against the block
fn read_offset(block: &[u8], at: usize) -> Result<usize, AbiError> {
    let value = read_usize(block, at)?;
    if value % 32 != 0 {
        return Err(AbiError::Decode(format!(
            "tail offset {} is not 32-byte aligned",
            value
        )));
    }
    if value > block.len() {
        return Err(AbiError::Decode(format!(
            "tail offset {} points outside buffer of {} bytes",
            value,
            block.len()
        )));
    }
    Ok(value)
}

fn read_length(block: &[u8], at: usize) -> Result<usize, AbiError> {
    read_usize(block, at)
}

fn read_usize(block: &[u8], at: usize) -> Result<usize, AbiError> {
    let word = read_word(block, at)?;
    let value = U256::from_big_endian(word);
    if value > U256::from(u32::MAX) {
        return Err(AbiError::Decode(format!(
            "unreasonable offset or length: {}",
            value
        )));
    }
    Ok(value.as_usize())
}

fn sub_block(block: &[u8], at: usize) -> Result<&[u8], AbiError> {
    if at > block.len() {
        return Err(AbiError::Decode(format!(
            "content offset {} points outside buffer of {} bytes",
            at,
            block.len()
        )));
    }
    Ok(&block[at..])
}

fn decode_length_prefixed(block: &[u8], at: usize) -> Result<Vec<u8>, AbiError> {
    let len = read_length(block, at)?;
    let start = at + 32;
    let end = start
        .checked_add(len)
        .ok_or_else(|| AbiError::Decode("length overflow".to_string()))?;
    if block.len() < end {
        return Err(AbiError::Decode(format!(
            "buffer too short for {} content bytes at {}",
            len, start
        )));
    }
    Ok(block[start..end].to_vec())
}
