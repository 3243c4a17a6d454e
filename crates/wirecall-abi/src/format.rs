//! Result formatting
//!
//! Renders decoded values into human-readable, recursively structured text.
//! Formatting is total: a shape that doesn't match its descriptor degrades to
//! the raw debug rendering instead of erroring, so a successful decode is
//! never hidden behind a formatting failure.

use wirecall_primitives::{U256, WEI_PER_ETHER};

use crate::method::Param;
use crate::types::{ParamType, Value};

/// A field-name match entry: an exact name or a `*Suffix` glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    /// Matches the name exactly
    Exact(String),
    /// Matches any name ending with the suffix
    Suffix(String),
}

impl NamePattern {
    /// Parse a pattern string; a leading `*` makes it a suffix glob
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix('*') {
            Some(suffix) => NamePattern::Suffix(suffix.to_string()),
            None => NamePattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Exact(exact) => name == exact,
            NamePattern::Suffix(suffix) => name.ends_with(suffix.as_str()),
        }
    }
}

/// Formatter configuration: which field names get the ether-scaled and
/// timestamp renderings. Name-driven by observation, not type-driven.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// uint256 fields rendered with an ether-scaled form alongside the raw wei
    pub scaled_names: Vec<NamePattern>,
    /// Fields rendered as a UTC datetime alongside the raw seconds
    pub timestamp_names: Vec<NamePattern>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            scaled_names: ["price", "*Fee", "*Price"]
                .iter()
                .map(|p| NamePattern::parse(p))
                .collect(),
            timestamp_names: ["timestamp", "*Timestamp", "*UnixSeconds"]
                .iter()
                .map(|p| NamePattern::parse(p))
                .collect(),
        }
    }
}

impl FormatOptions {
    fn is_scaled(&self, name: &str) -> bool {
        !name.is_empty() && self.scaled_names.iter().any(|p| p.matches(name))
    }

    fn is_timestamp(&self, name: &str) -> bool {
        !name.is_empty() && self.timestamp_names.iter().any(|p| p.matches(name))
    }
}

/// Render a method's decoded outputs, one field per line, nested structures
/// indented beneath their parent
pub fn format_outputs(outputs: &[Param], values: &[Value], options: &FormatOptions) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        let (name, kind) = match outputs.get(i) {
            Some(param) => (param.name.as_str(), Some(&param.kind)),
            None => ("", None),
        };
        match kind {
            Some(kind) => write_value(&mut out, name, kind, value, options, 0),
            // More values than descriptors: degrade rather than drop data
            None => push_line(&mut out, 0, name, &format!("{:?}", value)),
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Render one named value against its descriptor
pub fn format_value(
    name: &str,
    kind: &ParamType,
    value: &Value,
    options: &FormatOptions,
) -> String {
    let mut out = String::new();
    write_value(&mut out, name, kind, value, options, 0);
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn write_value(
    out: &mut String,
    name: &str,
    kind: &ParamType,
    value: &Value,
    options: &FormatOptions,
    indent: usize,
) {
    match (kind, value) {
        (ParamType::Tuple(components), Value::Tuple(fields))
            if components.len() == fields.len() =>
        {
            // A named struct opens a block; an unnamed one (typically the
            // whole output) prints its fields at the current level.
            let child_indent = if name.is_empty() {
                indent
            } else {
                push_line(out, indent, name, "");
                indent + 1
            };
            for (component, (field_name, field_value)) in components.iter().zip(fields.iter()) {
                let label = if component.name.is_empty() {
                    field_name.as_str()
                } else {
                    component.name.as_str()
                };
                write_value(out, label, &component.kind, field_value, options, child_indent);
            }
        }
        (ParamType::Array(inner), Value::Array(items))
        | (ParamType::FixedArray(inner, _), Value::Array(items)) => {
            if matches!(inner.as_ref(), ParamType::Tuple(_)) {
                // Arrays of structs render an indexed block per element
                let child_indent = if name.is_empty() {
                    indent
                } else {
                    push_line(out, indent, name, "");
                    indent + 1
                };
                for (i, item) in items.iter().enumerate() {
                    write_value(
                        out,
                        &format!("[{}]", i),
                        inner,
                        item,
                        options,
                        child_indent,
                    );
                }
            } else {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| render_scalar("", inner, item, options))
                    .collect();
                push_line(out, indent, name, &format!("[{}]", rendered.join(", ")));
            }
        }
        _ => {
            let rendered = render_scalar(name, kind, value, options);
            push_line(out, indent, name, &rendered);
        }
    }
}

fn push_line(out: &mut String, indent: usize, name: &str, rendered: &str) {
    for _ in 0..indent {
        out.push_str("  ");
    }
    if name.is_empty() {
        out.push_str(rendered);
    } else if rendered.is_empty() {
        out.push_str(name);
        out.push(':');
    } else {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(rendered);
    }
    out.push('\n');
}

fn render_scalar(name: &str, kind: &ParamType, value: &Value, options: &FormatOptions) -> String {
    match (kind, value) {
        (ParamType::Uint(bits), Value::Uint(v)) => {
            if options.is_timestamp(name) {
                render_timestamp(*v)
            } else if *bits == 256 && options.is_scaled(name) {
                format!("{} ETH ({} wei)", render_ether(*v), v)
            } else {
                v.to_string()
            }
        }
        (ParamType::Int(_), Value::Int(v)) => v.to_string(),
        (ParamType::Bool, Value::Bool(b)) => b.to_string(),
        (ParamType::Address, Value::Address(addr)) => addr.to_hex(),
        (ParamType::Bytes, Value::Bytes(data))
        | (ParamType::FixedBytes(_), Value::FixedBytes(data)) => {
            format!("0x{}", hex::encode(data))
        }
        (ParamType::String, Value::String(s)) => s.clone(),
        // Shape mismatch: degrade to the raw decoded value
        (_, value) => format!("{:?}", value),
    }
}

/// Render a wei amount scaled to ether, trimming trailing fractional zeros
fn render_ether(wei: U256) -> String {
    let scale = U256::from(WEI_PER_ETHER);
    let whole = wei / scale;
    let remainder = wei % scale;
    if remainder.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>18}", remainder.to_string());
    let fraction = fraction.trim_end_matches('0');
    format!("{}.{}", whole, fraction)
}

/// Render a unix-seconds value as a UTC datetime with the raw value in
/// parentheses; zero means "not set". Values outside the datetime range
/// degrade to the plain number.
fn render_timestamp(seconds: U256) -> String {
    if seconds.is_zero() {
        return "0 (Not set)".to_string();
    }
    if seconds > U256::from(i64::MAX) {
        return seconds.to_string();
    }
    match chrono::DateTime::from_timestamp(seconds.as_u64() as i64, 0) {
        Some(datetime) => format!(
            "{} ({})",
            datetime.format("%Y-%m-%d %H:%M:%S UTC"),
            seconds
        ),
        None => seconds.to_string(),
    }
}
