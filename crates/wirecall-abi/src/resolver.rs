//! ABI type string resolution
//!
//! Turns type strings like `"uint256"`, `"address[]"` or `"tuple(...)[3]"`
//! into [`ParamType`] trees. Tuple component lists arrive as structured data
//! alongside the type string (the ABI JSON `components` field), not embedded
//! in the string itself.

use crate::error::AbiError;
use crate::types::{Component, ParamType};

/// Raw parameter entry as it appears in ABI JSON
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawParam {
    /// Parameter name (may be absent for outputs)
    #[serde(default)]
    pub name: String,
    /// Type string, e.g. `"uint256"` or `"tuple[2]"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Tuple components, present when the base type is `tuple`
    #[serde(default)]
    pub components: Vec<RawParam>,
}

/// Parse a type string without tuple components (scalar and array types).
///
/// A bare `tuple` base fails here; use [`resolve_type`] when structured
/// components are available.
pub fn parse_type(s: &str) -> Result<ParamType, AbiError> {
    resolve_type(s, &[])
}

/// Resolve a type string, taking tuple components from `components`.
pub fn resolve_type(s: &str, components: &[RawParam]) -> Result<ParamType, AbiError> {
    let s = s.trim();
    let (base, suffixes) = split_array_suffixes(s)?;

    let mut resolved = resolve_base(base, components)?;
    // Suffixes read left to right, innermost first: uint8[3][] is a dynamic
    // array of uint8[3].
    for suffix in suffixes {
        resolved = match suffix {
            Some(len) => ParamType::FixedArray(Box::new(resolved), len),
            None => ParamType::Array(Box::new(resolved)),
        };
    }
    Ok(resolved)
}

/// Resolve a full raw parameter into a named component
pub fn resolve_param(raw: &RawParam) -> Result<Component, AbiError> {
    Ok(Component::new(
        raw.name.clone(),
        resolve_type(&raw.kind, &raw.components)?,
    ))
}

fn resolve_base(base: &str, components: &[RawParam]) -> Result<ParamType, AbiError> {
    match base {
        "address" => Ok(ParamType::Address),
        "bool" => Ok(ParamType::Bool),
        "string" => Ok(ParamType::String),
        "bytes" => Ok(ParamType::Bytes),
        "tuple" => {
            if components.is_empty() {
                return Err(AbiError::Parse(
                    "tuple type requires a components list".to_string(),
                ));
            }
            let resolved: Result<Vec<Component>, AbiError> =
                components.iter().map(resolve_param).collect();
            Ok(ParamType::Tuple(resolved?))
        }
        _ => {
            if let Some(rest) = base.strip_prefix("uint") {
                return Ok(ParamType::Uint(parse_int_width(base, rest)?));
            }
            if let Some(rest) = base.strip_prefix("int") {
                return Ok(ParamType::Int(parse_int_width(base, rest)?));
            }
            if let Some(rest) = base.strip_prefix("bytes") {
                let width: usize = rest
                    .parse()
                    .map_err(|_| AbiError::Parse(format!("malformed bytes width: {}", base)))?;
                if !(1..=32).contains(&width) {
                    return Err(AbiError::Parse(format!(
                        "fixed bytes width out of range: {}",
                        base
                    )));
                }
                return Ok(ParamType::FixedBytes(width));
            }
            Err(AbiError::Parse(format!("unknown type: {}", base)))
        }
    }
}

/// Parse `uintN`/`intN` widths. A missing width defaults to 256; everything
/// else must be a multiple of 8 in [8, 256].
fn parse_int_width(full: &str, rest: &str) -> Result<usize, AbiError> {
    if rest.is_empty() {
        return Ok(256);
    }
    let bits: usize = rest
        .parse()
        .map_err(|_| AbiError::Parse(format!("malformed integer width: {}", full)))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::Parse(format!(
            "malformed integer width: {}",
            full
        )));
    }
    Ok(bits)
}

/// Split a type string into its base and array suffixes. Each suffix is
/// `Some(len)` for `[N]` or `None` for `[]`.
fn split_array_suffixes(s: &str) -> Result<(&str, Vec<Option<usize>>), AbiError> {
    let Some(open) = s.find('[') else {
        if s.contains(']') {
            return Err(AbiError::Parse(format!("unbalanced brackets: {}", s)));
        }
        return Ok((s, Vec::new()));
    };

    let base = &s[..open];
    let mut suffixes = Vec::new();
    let mut rest = &s[open..];
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(AbiError::Parse(format!("unbalanced brackets: {}", s)));
        }
        let Some(close) = rest.find(']') else {
            return Err(AbiError::Parse(format!("unbalanced brackets: {}", s)));
        };
        let inner = &rest[1..close];
        if inner.is_empty() {
            suffixes.push(None);
        } else {
            let len: usize = inner
                .parse()
                .map_err(|_| AbiError::Parse(format!("malformed array length: {}", s)))?;
            suffixes.push(Some(len));
        }
        rest = &rest[close + 1..];
    }
    Ok((base, suffixes))
}
