//! Parameter coercion
//!
//! Turns user-supplied strings into typed [`Value`]s according to a
//! [`ParamType`] descriptor. Purely local: every failure happens before any
//! I/O is attempted.

use wirecall_primitives::{Address, U256};

use crate::error::ParameterError;
use crate::method::Param;
use crate::types::{I256, ParamType, Value};

/// Coerce one raw string per input parameter. The argument list must cover
/// every input exactly.
pub fn coerce_args(inputs: &[Param], raw: &[String]) -> Result<Vec<Value>, ParameterError> {
    if raw.len() > inputs.len() {
        return Err(ParameterError::LengthMismatch {
            name: "arguments".to_string(),
            expected: inputs.len(),
            got: raw.len(),
        });
    }
    inputs
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let value = raw
                .get(i)
                .ok_or_else(|| ParameterError::MissingParameter(param.name.clone()))?;
            coerce(&param.name, &param.kind, value)
        })
        .collect()
}

/// Coerce a single raw string against a descriptor
pub fn coerce(name: &str, kind: &ParamType, raw: &str) -> Result<Value, ParameterError> {
    // Strings pass through unmodified; everything else tolerates surrounding
    // whitespace.
    if matches!(kind, ParamType::String) {
        if raw.is_empty() {
            return Err(ParameterError::MissingParameter(name.to_string()));
        }
        return Ok(Value::String(raw.to_string()));
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() && !matches!(kind, ParamType::Bool) {
        return Err(ParameterError::MissingParameter(name.to_string()));
    }

    match kind {
        ParamType::Uint(bits) => coerce_uint(name, *bits, trimmed),
        ParamType::Int(bits) => coerce_int(name, *bits, trimmed),
        ParamType::Address => coerce_address(name, trimmed),
        ParamType::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ParameterError::InvalidBool(name.to_string())),
        },
        ParamType::Bytes => Ok(Value::Bytes(coerce_hex(name, trimmed, None)?)),
        ParamType::FixedBytes(width) => {
            Ok(Value::FixedBytes(coerce_hex(name, trimmed, Some(*width))?))
        }
        ParamType::String => unreachable!("handled above"),
        ParamType::Array(_) | ParamType::FixedArray(_, _) | ParamType::Tuple(_) => {
            let json: serde_json::Value = serde_json::from_str(trimmed)
                .map_err(|_| ParameterError::NotAnArray(name.to_string()))?;
            coerce_json(name, kind, &json)
        }
    }
}

/// Coerce a parsed JSON node. Aggregates recurse structurally; scalars are
/// rendered back to text and go through the scalar rules, so a JSON number,
/// string or boolean element all behave the same as top-level input.
fn coerce_json(
    name: &str,
    kind: &ParamType,
    json: &serde_json::Value,
) -> Result<Value, ParameterError> {
    match kind {
        ParamType::Array(inner) => {
            let items = as_json_array(name, json)?;
            let values: Result<Vec<Value>, ParameterError> = items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_json(&format!("{}[{}]", name, i), inner, item))
                .collect();
            Ok(Value::Array(values?))
        }
        ParamType::FixedArray(inner, len) => {
            let items = as_json_array(name, json)?;
            if items.len() != *len {
                return Err(ParameterError::LengthMismatch {
                    name: name.to_string(),
                    expected: *len,
                    got: items.len(),
                });
            }
            let values: Result<Vec<Value>, ParameterError> = items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce_json(&format!("{}[{}]", name, i), inner, item))
                .collect();
            Ok(Value::Array(values?))
        }
        ParamType::Tuple(components) => {
            let items = as_json_array(name, json)?;
            if items.len() != components.len() {
                return Err(ParameterError::LengthMismatch {
                    name: name.to_string(),
                    expected: components.len(),
                    got: items.len(),
                });
            }
            let mut fields = Vec::with_capacity(components.len());
            for (component, item) in components.iter().zip(items.iter()) {
                let child = format!("{}.{}", name, component.name);
                let value = coerce_json(&child, &component.kind, item)?;
                fields.push((component.name.clone(), value));
            }
            Ok(Value::Tuple(fields))
        }
        _ => {
            let text = match json {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            coerce(name, kind, &text)
        }
    }
}

fn as_json_array<'a>(
    name: &str,
    json: &'a serde_json::Value,
) -> Result<&'a Vec<serde_json::Value>, ParameterError> {
    json.as_array()
        .ok_or_else(|| ParameterError::NotAnArray(name.to_string()))
}

/// Decimal integer literal check: optional leading minus, digits only
fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn coerce_uint(name: &str, bits: usize, raw: &str) -> Result<Value, ParameterError> {
    if !is_decimal(raw) {
        return Err(ParameterError::InvalidNumber {
            name: name.to_string(),
            input: raw.to_string(),
        });
    }
    let out_of_range = || ParameterError::OutOfRange {
        name: name.to_string(),
        ty: format!("uint{}", bits),
        input: raw.to_string(),
    };
    if raw.starts_with('-') {
        return Err(out_of_range());
    }
    let value = U256::from_dec_str(raw).map_err(|_| out_of_range())?;
    if bits < 256 {
        let max = (U256::one() << bits) - U256::one();
        if value > max {
            return Err(out_of_range());
        }
    }
    Ok(Value::Uint(value))
}

fn coerce_int(name: &str, bits: usize, raw: &str) -> Result<Value, ParameterError> {
    if !is_decimal(raw) {
        return Err(ParameterError::InvalidNumber {
            name: name.to_string(),
            input: raw.to_string(),
        });
    }
    let out_of_range = || ParameterError::OutOfRange {
        name: name.to_string(),
        ty: format!("int{}", bits),
        input: raw.to_string(),
    };
    let negative = raw.starts_with('-');
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let abs = U256::from_dec_str(digits).map_err(|_| out_of_range())?;

    // Signed range: [-2^(N-1), 2^(N-1) - 1]
    let negative_bound = U256::one() << (bits - 1);
    let bound = if negative {
        negative_bound
    } else {
        negative_bound - U256::one()
    };
    if abs > bound {
        return Err(out_of_range());
    }
    Ok(Value::Int(I256::new(abs, negative)))
}

fn coerce_address(name: &str, raw: &str) -> Result<Value, ParameterError> {
    // Strict shape: 0x followed by exactly 40 hex digits. Checksum casing is
    // deliberately not validated.
    let invalid = || ParameterError::InvalidAddress(name.to_string());
    let hex_part = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let address = Address::from_hex(raw).map_err(|_| invalid())?;
    Ok(Value::Address(address))
}

fn coerce_hex(name: &str, raw: &str, width: Option<usize>) -> Result<Vec<u8>, ParameterError> {
    let invalid = || ParameterError::InvalidHex(name.to_string());
    let hex_part = raw.strip_prefix("0x").ok_or_else(invalid)?;
    let bytes = hex::decode(hex_part).map_err(|_| invalid())?;
    if let Some(width) = width {
        if bytes.len() != width {
            return Err(invalid());
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(bits: usize) -> ParamType {
        ParamType::Uint(bits)
    }

    #[test]
    fn test_uint_range_edges() {
        assert_eq!(
            coerce("x", &uint(8), "255").unwrap(),
            Value::Uint(U256::from(255))
        );
        assert!(matches!(
            coerce("x", &uint(8), "256"),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerce("x", &uint(256), "-1"),
            Err(ParameterError::OutOfRange { .. })
        ));
        // uint256 max is fine
        let max = U256::MAX.to_string();
        assert_eq!(coerce("x", &uint(256), &max).unwrap(), Value::Uint(U256::MAX));
    }

    #[test]
    fn test_uint_rejects_non_decimal() {
        for bad in ["0x10", "1.5", "1e18", "12a", "ten", "--2"] {
            assert!(
                matches!(
                    coerce("x", &uint(256), bad),
                    Err(ParameterError::InvalidNumber { .. })
                ),
                "expected InvalidNumber for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_int_range_edges() {
        let int8 = ParamType::Int(8);
        assert_eq!(
            coerce("x", &int8, "127").unwrap(),
            Value::Int(I256::from_i128(127))
        );
        assert_eq!(
            coerce("x", &int8, "-128").unwrap(),
            Value::Int(I256::from_i128(-128))
        );
        assert!(matches!(
            coerce("x", &int8, "128"),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            coerce("x", &int8, "-129"),
            Err(ParameterError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_address_shape() {
        let ok = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";
        assert!(matches!(
            coerce("to", &ParamType::Address, ok).unwrap(),
            Value::Address(_)
        ));

        // 39 and 41 hex digits, and a missing prefix, all fail
        let short = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3";
        let long = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3dd";
        let unprefixed = "742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";
        for bad in [short, long, unprefixed] {
            assert_eq!(
                coerce("to", &ParamType::Address, bad),
                Err(ParameterError::InvalidAddress("to".to_string()))
            );
        }
    }

    #[test]
    fn test_bool_case_insensitive() {
        assert_eq!(coerce("b", &ParamType::Bool, "true").unwrap(), Value::Bool(true));
        assert_eq!(coerce("b", &ParamType::Bool, "FALSE").unwrap(), Value::Bool(false));
        assert_eq!(coerce("b", &ParamType::Bool, "True").unwrap(), Value::Bool(true));
        assert!(matches!(
            coerce("b", &ParamType::Bool, "yes"),
            Err(ParameterError::InvalidBool(_))
        ));
    }

    #[test]
    fn test_empty_input_is_missing() {
        for kind in [uint(256), ParamType::Address, ParamType::String, ParamType::Bytes] {
            assert!(
                matches!(
                    coerce("p", &kind, ""),
                    Err(ParameterError::MissingParameter(_))
                ),
                "expected MissingParameter for {:?}",
                kind
            );
        }
    }

    #[test]
    fn test_bytes_hex() {
        assert_eq!(
            coerce("d", &ParamType::Bytes, "0xdeadbeef").unwrap(),
            Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef])
        );
        // Odd-length hex fails
        assert!(matches!(
            coerce("d", &ParamType::Bytes, "0xabc"),
            Err(ParameterError::InvalidHex(_))
        ));
        // Missing prefix fails
        assert!(coerce("d", &ParamType::Bytes, "deadbeef").is_err());

        // Fixed width enforces exact length
        assert_eq!(
            coerce("d", &ParamType::FixedBytes(4), "0xdeadbeef").unwrap(),
            Value::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef])
        );
        assert!(matches!(
            coerce("d", &ParamType::FixedBytes(8), "0xdeadbeef"),
            Err(ParameterError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_string_passthrough() {
        assert_eq!(
            coerce("s", &ParamType::String, "  hello world  ").unwrap(),
            Value::String("  hello world  ".to_string())
        );
    }

    #[test]
    fn test_array_json_literal() {
        let kind = ParamType::Array(Box::new(uint(256)));
        assert_eq!(
            coerce("xs", &kind, "[1, \"2\", 3]").unwrap(),
            Value::Array(vec![
                Value::Uint(U256::from(1)),
                Value::Uint(U256::from(2)),
                Value::Uint(U256::from(3)),
            ])
        );
        assert!(matches!(
            coerce("xs", &kind, "not json"),
            Err(ParameterError::NotAnArray(_))
        ));
        // Element errors carry the element path
        match coerce("xs", &kind, "[1, \"nope\"]") {
            Err(ParameterError::InvalidNumber { name, .. }) => assert_eq!(name, "xs[1]"),
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_array_length() {
        let kind = ParamType::FixedArray(Box::new(uint(256)), 3);
        assert!(coerce("xs", &kind, "[1,2,3]").is_ok());
        assert_eq!(
            coerce("xs", &kind, "[1,2]"),
            Err(ParameterError::LengthMismatch {
                name: "xs".to_string(),
                expected: 3,
                got: 2,
            })
        );
    }

    #[test]
    fn test_tuple_positional() {
        let kind = ParamType::Tuple(vec![
            crate::types::Component::new("amount", uint(256)),
            crate::types::Component::new("ok", ParamType::Bool),
        ]);
        assert_eq!(
            coerce("t", &kind, "[5, true]").unwrap(),
            Value::Tuple(vec![
                ("amount".to_string(), Value::Uint(U256::from(5))),
                ("ok".to_string(), Value::Bool(true)),
            ])
        );
        assert!(matches!(
            coerce("t", &kind, "[5]"),
            Err(ParameterError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_nested_array_of_tuples() {
        let kind = ParamType::Array(Box::new(ParamType::Tuple(vec![
            crate::types::Component::new("to", ParamType::Address),
            crate::types::Component::new("amounts", ParamType::Array(Box::new(uint(256)))),
        ])));
        let raw = r#"[["0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d", [1, 2]]]"#;
        let value = coerce("batch", &kind, raw).unwrap();
        match value {
            Value::Array(items) => {
                assert_eq!(items.len(), 1);
                assert!(matches!(items[0], Value::Tuple(_)));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_coerce_args_arity() {
        let inputs = vec![
            Param::new("to", ParamType::Address),
            Param::new("amount", uint(256)),
        ];
        let args = vec!["0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d".to_string()];
        assert_eq!(
            coerce_args(&inputs, &args),
            Err(ParameterError::MissingParameter("amount".to_string()))
        );

        let too_many = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(matches!(
            coerce_args(&inputs, &too_many),
            Err(ParameterError::LengthMismatch { .. })
        ));
    }
}
