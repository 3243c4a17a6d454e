//! Engine error types

use thiserror::Error;

use wirecall_abi::{AbiError, ParameterError};

use crate::transport::TransportError;

/// Errors produced by the contract execution engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// ABI load, encode or decode failure
    #[error("abi error: {0}")]
    Abi(#[from] AbiError),

    /// Parameter coercion failure
    #[error("parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Gas estimation was rejected by the node; carries the node's message
    #[error("gas estimation failed: {0}")]
    Estimation(String),

    /// Method name not present in the loaded ABI
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// A write was requested but no signer is configured
    #[error("method '{0}' requires a signer")]
    SignerUnavailable(String),

    /// Continuous execution was requested for a read-only method
    #[error("method '{0}' is read-only and cannot be executed continuously")]
    NotWritable(String),

    /// A continuous session is already running on this engine
    #[error("a continuous execution session is already active")]
    SessionActive,
}
