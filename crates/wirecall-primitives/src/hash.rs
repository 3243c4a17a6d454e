//! 32-byte hash type and Keccak-256

use std::fmt;
use thiserror::Error;

use sha3::{Digest, Keccak256};

/// Hash parsing error
#[derive(Debug, Error)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// 32-byte hash value
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct H256([u8; 32]);

impl H256 {
    /// Size of a hash in bytes
    pub const LEN: usize = 32;

    /// Zero hash
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create a hash from a byte array
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Create a hash from a byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        if slice.len() != Self::LEN {
            return Err(HashError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(H256(bytes))
    }

    /// Parse a hash from a hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as a byte slice
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check whether this is the zero hash
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to a lowercase hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Compute the Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_bytes(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        // keccak256("")
        let hash = keccak256(&[]);
        assert_eq!(
            hash.to_hex(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_hello() {
        let hash = keccak256(b"hello");
        assert_eq!(
            hash.to_hex(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_keccak256_transfer_selector() {
        // keccak256("transfer(address,uint256)") - ERC20 transfer selector
        let hash = keccak256(b"transfer(address,uint256)");
        assert_eq!(&hash.as_bytes()[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_keccak256_deterministic() {
        let data = b"same input, same output";
        assert_eq!(keccak256(data), keccak256(data));
        assert_ne!(keccak256(b"a"), keccak256(b"b"));
    }

    #[test]
    fn test_h256_hex_roundtrip() {
        let hash = keccak256(b"roundtrip");
        let parsed = H256::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_h256_bad_length() {
        match H256::from_hex("0x1234") {
            Err(HashError::InvalidLength(2)) => {}
            other => panic!("expected InvalidLength(2), got {:?}", other),
        }
    }
}
