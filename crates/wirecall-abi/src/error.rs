//! ABI error types

use thiserror::Error;

/// ABI-level error
#[derive(Debug, Error)]
pub enum AbiError {
    /// ABI text or type string could not be parsed; nothing is partially loaded
    #[error("ABI parse error: {0}")]
    Parse(String),

    /// Encoder was handed a value that does not match its descriptor.
    /// With a well-formed descriptor this indicates a defect, not bad input.
    #[error("ABI encoding error: {0}")]
    Encode(String),

    /// Raw result bytes do not match the output layout
    #[error("ABI decoding error: {0}")]
    Decode(String),

    /// The raw result was zero-length for a method that declares outputs,
    /// e.g. a call against an address with no matching code. Kept distinct
    /// from a decode failure.
    #[error("call returned no data")]
    EmptyResult,
}

/// Parameter coercion error. All variants are raised before any I/O happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    /// Empty input for a parameter that requires a value
    #[error("missing value for parameter `{0}`")]
    MissingParameter(String),

    /// Not a decimal integer literal
    #[error("invalid number for `{name}`: {input:?}")]
    InvalidNumber {
        /// Parameter name
        name: String,
        /// Offending input
        input: String,
    },

    /// Integer literal outside the type's representable range
    #[error("value out of range for `{name}` ({ty}): {input}")]
    OutOfRange {
        /// Parameter name
        name: String,
        /// Canonical type the value was checked against
        ty: String,
        /// Offending input
        input: String,
    },

    /// Not a 0x-prefixed 40-hex-digit address
    #[error("invalid address for `{0}`")]
    InvalidAddress(String),

    /// Not `true` or `false`
    #[error("invalid boolean for `{0}`")]
    InvalidBool(String),

    /// Not valid 0x-prefixed hex, or wrong length for a fixed-bytes type
    #[error("invalid hex data for `{0}`")]
    InvalidHex(String),

    /// Aggregate literal has the wrong number of elements
    #[error("length mismatch for `{name}`: expected {expected}, got {got}")]
    LengthMismatch {
        /// Parameter name
        name: String,
        /// Required element count
        expected: usize,
        /// Supplied element count
        got: usize,
    },

    /// Aggregate parameter is not a JSON array literal
    #[error("expected a JSON array literal for `{0}`")]
    NotAnArray(String),
}
